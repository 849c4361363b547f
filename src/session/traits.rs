use std::sync::Arc;

use async_trait::async_trait;

use super::events::{ListenerId, SessionListener};
use crate::error::SessionError;
use crate::types::{PlayableItem, SessionPlaybackState, SessionToken};

/// Handle to a connected playback session
///
/// Commands are fire-and-forget; the session reports their effect through
/// listener events. Queries answer from the session's current snapshot.
pub trait MediaSession: Send + Sync {
    /// Register a listener for session events
    fn add_listener(&self, listener: SessionListener) -> ListenerId;

    /// Remove a previously registered listener
    fn remove_listener(&self, id: ListenerId);

    /// Start or resume playback
    fn play(&self);

    /// Pause playback
    fn pause(&self);

    /// Seek to an absolute position
    fn seek_to(&self, position_ms: u64);

    /// Replace the current item
    fn set_media_item(&self, item: PlayableItem);

    /// Prepare the current item for playback
    fn prepare(&self);

    /// Release the connection; the handle must not be used afterwards
    fn release(&self);

    /// Whether audio is being produced
    fn is_playing(&self) -> bool;

    /// Coarse playback state
    fn playback_state(&self) -> SessionPlaybackState;

    /// Current position in the current item
    fn current_position_ms(&self) -> u64;

    /// Duration of the current item, `None` if unknown
    fn duration_ms(&self) -> Option<u64>;

    /// Media ID of the current item
    fn current_media_id(&self) -> Option<String>;
}

/// Performs the connection handshake with a playback service
#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// Build a session handle bound to the service identified by `token`
    ///
    /// `Ok(None)` means the handshake completed without producing a handle.
    async fn connect(
        &self,
        token: &SessionToken,
    ) -> Result<Option<Arc<dyn MediaSession>>, SessionError>;
}
