//! Event bus for player events

use tokio::sync::broadcast;

use crate::types::PlayerState;

/// Player events
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    // Connection events
    /// Session connection established
    Connected,
    /// Connection attempt failed
    ConnectionFailed {
        /// Error message
        message: String,
    },
    /// Connection attempt was interrupted
    ConnectionInterrupted,
    /// Controller released its session
    Released,

    // Playback events
    /// Player state changed
    StateChanged {
        /// Old state
        old: PlayerState,
        /// New state
        new: PlayerState,
    },
    /// New item handed to the session
    MediaItemLoaded {
        /// Item ID
        id: String,
    },
    /// Ended item restarted from the beginning
    Restarted {
        /// Item ID
        id: String,
    },
    /// User-initiated seek issued
    Seeked {
        /// Absolute target position
        position_ms: u64,
        /// Progress published for the target
        progress: f32,
    },
}

impl PlayerEvent {
    /// Whether the event concerns the session connection
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::Connected
                | Self::ConnectionFailed { .. }
                | Self::ConnectionInterrupted
                | Self::Released
        )
    }

    /// Whether the event concerns what is playing and where
    #[must_use]
    pub fn is_playback(&self) -> bool {
        !self.is_connection()
    }
}

/// Event bus for distributing events
pub struct EventBus {
    /// Broadcast sender
    tx: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Create a new event bus
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self { tx }
    }

    /// Subscribe to events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event
    pub fn emit(&self, event: PlayerEvent) {
        // Ignore error if no receivers
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver that yields only the events a predicate accepts
pub struct EventFilter {
    rx: broadcast::Receiver<PlayerEvent>,
    accepts: fn(&PlayerEvent) -> bool,
}

impl EventFilter {
    /// Wrap a receiver
    #[must_use]
    pub fn new(rx: broadcast::Receiver<PlayerEvent>, accepts: fn(&PlayerEvent) -> bool) -> Self {
        Self { rx, accepts }
    }

    /// Playback events only: state changes, loads, restarts and seeks
    #[must_use]
    pub fn playback(rx: broadcast::Receiver<PlayerEvent>) -> Self {
        Self::new(rx, PlayerEvent::is_playback)
    }

    /// Connection events only
    #[must_use]
    pub fn connection(rx: broadcast::Receiver<PlayerEvent>) -> Self {
        Self::new(rx, PlayerEvent::is_connection)
    }

    /// Next accepted event, or `None` once the controller is gone
    ///
    /// Events lost to lag are skipped.
    pub async fn recv(&mut self) -> Option<PlayerEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if (self.accepts)(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next accepted event that is already queued
    pub fn try_recv(&mut self) -> Option<PlayerEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if (self.accepts)(&event) => return Some(event),
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }
}
