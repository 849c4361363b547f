//! # playback-controller
//!
//! Audio playback controller over an out-of-process media session.
//!
//! ## Features
//!
//! - Asynchronous, cancellable session connection
//! - Player state machine driven by session events
//! - Normalized progress polled while playing, with optimistic seeks
//! - Failures folded into observable state, never returned to callers
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use playback_controller::testing::{MockConnector, MockSession};
//! use playback_controller::{AudioPlayerController, MediaItem, PlayerConfig};
//!
//! # async fn example() -> Result<(), playback_controller::PlayerError> {
//! let connector = Arc::new(MockConnector::with_session(Arc::new(MockSession::new())));
//! let config = PlayerConfig::builder()
//!     .base_url("https://api.example.com/")
//!     .build();
//!
//! let player = AudioPlayerController::new(config, connector)?;
//! player.initialize();
//!
//! let mut state = player.player_state();
//! while state.changed().await.is_ok() {
//!     println!("player is {}", *state.borrow());
//! #   break;
//! }
//!
//! player.prepare_and_play(&MediaItem::new("ep-1", "episode1.mp3"));
//! player.release();
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Controller**: [`AudioPlayerController`] - the one component holding the session
//! - **Session**: [`session`] - traits the playback service is reached through
//! - **State**: [`state`] - observable values and the event bus

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Crash-report side channel
pub mod diagnostics;
/// Error types
pub mod error;
/// Session collaborator interface
pub mod session;
/// State management
pub mod state;
/// Core types
pub mod types;

/// Testing utilities
pub mod testing;

// Internal modules
mod controller;

// Re-exports
pub use controller::{AudioPlayerController, ControllerBuilder};
pub use diagnostics::{DiagnosticContext, DiagnosticsSink, TracingDiagnostics};
pub use error::{PlayerError, SessionError};
pub use session::{MediaSession, SessionConnector, SessionEvent, SessionListener};
pub use state::{EventFilter, PlayerEvent};
pub use types::{
    MediaItem, PlayableItem, PlayerConfig, PlayerState, SessionPlaybackState, SessionToken,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
///
/// Convenient re-exports
pub mod prelude {
    pub use crate::{
        AudioPlayerController, MediaItem, MediaSession, PlayerConfig, PlayerError, PlayerEvent,
        PlayerState, SessionConnector, SessionToken,
    };
}
