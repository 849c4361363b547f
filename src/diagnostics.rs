//! Side channel for unexpected failures
//!
//! Connection failures never reach the caller as errors. They are folded into
//! [`PlayerState::Error`](crate::types::PlayerState::Error) and, in addition,
//! handed to a [`DiagnosticsSink`] together with where they happened, so an
//! integrator can forward them to a crash reporter.

use std::collections::HashMap;

use crate::error::PlayerError;

/// Where a failure happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticContext {
    /// Screen the player belongs to
    pub screen: String,
    /// Component that failed
    pub component: String,
    /// Action being performed
    pub action: String,
}

impl DiagnosticContext {
    /// Create a new context
    pub fn new(
        screen: impl Into<String>,
        component: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            screen: screen.into(),
            component: component.into(),
            action: action.into(),
        }
    }

    /// Flatten into the key/value form crash reporters expect
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            ("screen".to_string(), self.screen.clone()),
            ("component".to_string(), self.component.clone()),
            ("action".to_string(), self.action.clone()),
        ])
    }
}

/// Receives failures the controller absorbed
pub trait DiagnosticsSink: Send + Sync {
    /// Record a failure
    fn record(&self, error: &PlayerError, context: &DiagnosticContext);
}

/// Default sink: logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn record(&self, error: &PlayerError, context: &DiagnosticContext) {
        tracing::error!(
            screen = %context.screen,
            component = %context.component,
            action = %context.action,
            "{}",
            error
        );
    }
}
