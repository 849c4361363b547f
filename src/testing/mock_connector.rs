//! Mock session connector
//!
//! Resolves every connection attempt with a scripted outcome, optionally holding
//! each attempt pending until the test opens a gate.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::mock_session::MockSession;
use crate::error::SessionError;
use crate::session::{MediaSession, SessionConnector};
use crate::types::SessionToken;

/// How a connection attempt resolves
#[derive(Debug, Clone)]
pub enum ConnectOutcome {
    /// Hand out this session
    Session(Arc<MockSession>),
    /// Resolve without a session
    Null,
    /// Fail with `SessionError::Execution`
    Fail(String),
    /// Fail with `SessionError::Interrupted`
    Interrupted,
    /// Fail with `SessionError::Unexpected`
    Unexpected(String),
    /// Panic inside the connector
    Panic(String),
}

/// Scripted [`SessionConnector`]
#[derive(Debug)]
pub struct MockConnector {
    outcome: Mutex<ConnectOutcome>,
    attempts: AtomicUsize,
    tokens: Mutex<Vec<SessionToken>>,
    gate: Option<Arc<Notify>>,
}

impl MockConnector {
    /// Create a connector resolving every attempt with `outcome`
    #[must_use]
    pub fn new(outcome: ConnectOutcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            attempts: AtomicUsize::new(0),
            tokens: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Create a connector handing out `session`
    #[must_use]
    pub fn with_session(session: Arc<MockSession>) -> Self {
        Self::new(ConnectOutcome::Session(session))
    }

    /// Hold every attempt pending until [`MockConnector::open_gate`]
    #[must_use]
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    /// Let one pending (or the next) attempt resolve
    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Change the outcome of future attempts
    pub fn set_outcome(&self, outcome: ConnectOutcome) {
        *self.outcome.lock() = outcome;
    }

    /// Number of connection attempts started
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Tokens attempts were made with
    #[must_use]
    pub fn tokens(&self) -> Vec<SessionToken> {
        self.tokens.lock().clone()
    }
}

#[async_trait]
impl SessionConnector for MockConnector {
    async fn connect(
        &self,
        token: &SessionToken,
    ) -> Result<Option<Arc<dyn MediaSession>>, SessionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().push(token.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let outcome = self.outcome.lock().clone();
        match outcome {
            ConnectOutcome::Session(session) => Ok(Some(session as Arc<dyn MediaSession>)),
            ConnectOutcome::Null => Ok(None),
            ConnectOutcome::Fail(message) => Err(SessionError::execution(message)),
            ConnectOutcome::Interrupted => Err(SessionError::Interrupted),
            ConnectOutcome::Unexpected(message) => Err(SessionError::Unexpected { message }),
            ConnectOutcome::Panic(message) => std::panic::panic_any(message),
        }
    }
}
