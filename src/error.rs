use std::time::Duration;

use thiserror::Error;

/// Errors reported by a [`SessionConnector`](crate::session::SessionConnector)
/// while building a session handle
#[derive(Debug, Error)]
pub enum SessionError {
    /// The connection attempt itself failed
    #[error("{message}")]
    Execution {
        /// Description of the failure
        message: String,
        /// The underlying source of the error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The connection attempt was interrupted before it resolved
    #[error("connection interrupted")]
    Interrupted,

    /// Anything the connector did not anticipate
    #[error("{message}")]
    Unexpected {
        /// Description of the failure
        message: String,
    },
}

impl SessionError {
    /// Create an execution failure without an underlying source
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            source: None,
        }
    }
}

/// Errors surfaced by the playback controller
///
/// The `Display` output of the connection variants is exactly the message carried
/// by [`PlayerState::Error`](crate::types::PlayerState::Error).
#[derive(Debug, Error)]
pub enum PlayerError {
    // ===== Connection Errors =====
    /// The connector resolved without a session handle
    #[error("Failed to connect to MediaController: Controller is null.")]
    NullController,

    /// The connection attempt failed
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the failure
        message: String,
        /// The underlying source of the error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The connection attempt did not resolve in time
    #[error("Connection error: timed out after {duration:?}")]
    ConnectionTimeout {
        /// The configured timeout
        duration: Duration,
    },

    /// The connection attempt was interrupted
    #[error("Connection interrupted.")]
    Interrupted,

    /// The connection attempt failed in a way nobody anticipated
    #[error("An unexpected error occurred during connection: {message}")]
    Unexpected {
        /// Description of the failure
        message: String,
    },

    // ===== Configuration Errors =====
    /// Configuration could not be loaded
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the failure
        message: String,
        /// The underlying source of the error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PlayerError {
    /// Check if this error came out of a connection attempt
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        !matches!(self, Self::Config { .. })
    }

    /// Check if calling `initialize()` again may succeed
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionTimeout { .. } | Self::Interrupted
        )
    }
}

impl From<SessionError> for PlayerError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Execution { message, source } => Self::Connection { message, source },
            SessionError::Interrupted => Self::Interrupted,
            SessionError::Unexpected { message } => Self::Unexpected { message },
        }
    }
}

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, PlayerError>;
