//! Observable player state

use tokio::sync::watch;

use crate::types::PlayerState;

/// Holds the two values the UI observes
///
/// Both are backed by `watch` channels: every subscriber sees the latest value
/// immediately and is woken on change. The two channels are independent.
pub struct StateContainer {
    /// Player state sender
    state_tx: watch::Sender<PlayerState>,
    /// Normalized progress sender
    progress_tx: watch::Sender<f32>,
}

impl StateContainer {
    /// Create a new state container
    #[must_use]
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(PlayerState::default());
        let (progress_tx, _) = watch::channel(0.0);
        Self {
            state_tx,
            progress_tx,
        }
    }

    /// Get current player state
    #[must_use]
    pub fn state(&self) -> PlayerState {
        self.state_tx.borrow().clone()
    }

    /// Get current progress
    #[must_use]
    pub fn progress(&self) -> f32 {
        *self.progress_tx.borrow()
    }

    /// Subscribe to player state changes
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<PlayerState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to progress changes
    #[must_use]
    pub fn subscribe_progress(&self) -> watch::Receiver<f32> {
        self.progress_tx.subscribe()
    }

    /// Set player state, returning the previous one
    pub fn set_state(&self, state: PlayerState) -> PlayerState {
        self.state_tx.send_replace(state)
    }

    /// Set progress
    ///
    /// Values outside `[0.0, 1.0]` are clamped and non-finite values become `0.0`.
    pub fn set_progress(&self, progress: f32) {
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.progress_tx.send_replace(progress);
    }

    /// Return to `Idle` with no progress, returning the previous state
    pub fn reset(&self) -> PlayerState {
        let old = self.set_state(PlayerState::Idle);
        self.set_progress(0.0);
        old
    }
}

impl Default for StateContainer {
    fn default() -> Self {
        Self::new()
    }
}
