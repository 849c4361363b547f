//! Testing utilities
//!
//! In-memory stand-ins for the playback service, used by the crate's tests and
//! demos and available to integrators wiring a controller into their own tests.

pub mod mock_connector;
pub mod mock_session;

pub use mock_connector::{ConnectOutcome, MockConnector};
pub use mock_session::{MockSession, SessionCommand};

use crate::types::MediaItem;

/// Helper to create a `MediaItem` for testing
#[must_use]
pub fn create_test_item(id: &str) -> MediaItem {
    MediaItem::new(id, format!("{id}.mp3"))
        .with_title(format!("Episode {id}"))
        .with_artist("Test Host")
        .with_artwork(format!("{id}.png"))
}
