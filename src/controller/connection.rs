//! Session connection lifecycle

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::error::PlayerError;
use crate::session::{ListenerId, MediaSession, SessionConnector};
use crate::types::SessionToken;

/// The controller's one connection slot
pub(crate) enum SessionConnection {
    /// No connection and no attempt in flight
    Disconnected,
    /// Handshake in flight
    Connecting {
        /// Attempt number, used to discard results of superseded attempts
        attempt: u64,
        /// Task running the handshake
        task: JoinHandle<()>,
    },
    /// Session established
    Connected(ActiveSession),
}

/// An established session and everything registered against it
pub(crate) struct ActiveSession {
    pub(crate) session: Arc<dyn MediaSession>,
    pub(crate) listener: ListenerId,
    /// Task applying session events
    pub(crate) pump: JoinHandle<()>,
}

impl SessionConnection {
    pub(crate) fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected)
    }

    pub(crate) fn is_attempt(&self, expected: u64) -> bool {
        matches!(self, Self::Connecting { attempt, .. } if *attempt == expected)
    }

    pub(crate) fn session(&self) -> Option<Arc<dyn MediaSession>> {
        match self {
            Self::Connected(active) => Some(active.session.clone()),
            Self::Disconnected | Self::Connecting { .. } => None,
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting { .. } => "connecting",
            Self::Connected(_) => "connected",
        }
    }

    /// Cancel or release whatever this slot holds
    ///
    /// Returns `false` if there was nothing to tear down.
    pub(crate) fn teardown(self) -> bool {
        match self {
            Self::Disconnected => false,
            Self::Connecting { task, .. } => {
                task.abort();
                true
            }
            Self::Connected(active) => {
                active.pump.abort();
                active.session.remove_listener(active.listener);
                active.session.release();
                true
            }
        }
    }
}

/// Run the handshake and fold every outcome into a session or a `PlayerError`
///
/// A panicking connector is reported as an unexpected failure instead of
/// unwinding through the controller's task.
pub(crate) async fn establish(
    connector: Arc<dyn SessionConnector>,
    token: SessionToken,
    timeout: Option<Duration>,
) -> Result<Arc<dyn MediaSession>, PlayerError> {
    let handshake = AssertUnwindSafe(connector.connect(&token)).catch_unwind();

    let outcome = match timeout {
        Some(duration) => tokio::time::timeout(duration, handshake)
            .await
            .map_err(|_| PlayerError::ConnectionTimeout { duration })?,
        None => handshake.await,
    };

    match outcome {
        Ok(Ok(Some(session))) => Ok(session),
        Ok(Ok(None)) => Err(PlayerError::NullController),
        Ok(Err(e)) => Err(e.into()),
        Err(payload) => Err(PlayerError::Unexpected {
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "connector panicked".to_string()
    }
}
