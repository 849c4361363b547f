use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::types::SessionPlaybackState;

/// Events a session reports to its listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session started or stopped producing audio
    IsPlayingChanged(bool),
    /// The session's coarse playback state changed
    PlaybackStateChanged(SessionPlaybackState),
}

/// Identifier returned when a listener is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

impl ListenerId {
    /// Generate a new unique ID
    #[must_use]
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener handed to a session
///
/// Sessions may call [`SessionListener::notify`] from any thread. Events are
/// queued and applied by the controller's own event task in delivery order.
#[derive(Debug, Clone)]
pub struct SessionListener {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionListener {
    /// Create a listener and the receiving end of its queue
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Deliver an event
    ///
    /// Returns `false` once the controller has stopped listening.
    pub fn notify(&self, event: SessionEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Check if the controller side is gone
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
