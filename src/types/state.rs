use std::fmt;

/// Coarse playback state reported by the session itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionPlaybackState {
    /// Nothing loaded
    #[default]
    Idle,
    /// Waiting for data
    Buffering,
    /// Able to play immediately
    Ready,
    /// Reached the end of the current item
    Ended,
}

/// Player state as observed by the UI
///
/// `Idle → Ready → {Playing ⇄ Paused} → Ended`, with `Buffering` reachable from
/// any active state and `Error` from anywhere until `initialize()` is retried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlayerState {
    /// No session connection
    #[default]
    Idle,
    /// Connected, nothing loaded yet
    Ready,
    /// Session is buffering
    Buffering,
    /// Session is playing
    Playing,
    /// Session is paused
    Paused,
    /// Current item played to the end
    Ended,
    /// Connection or runtime failure
    Error(String),
}

impl PlayerState {
    /// Derive the UI state from the session's `(is_playing, playback_state)` pair
    #[must_use]
    pub fn from_session(is_playing: bool, playback: SessionPlaybackState) -> Self {
        if is_playing {
            return Self::Playing;
        }
        match playback {
            SessionPlaybackState::Ended => Self::Ended,
            SessionPlaybackState::Buffering => Self::Buffering,
            SessionPlaybackState::Idle | SessionPlaybackState::Ready => Self::Paused,
        }
    }

    /// Check if the progress poller should be running
    #[must_use]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Check if a session is connected in this state
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle | Self::Error(_))
    }

    /// Error message, if this is the error state
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Ready => f.write_str("ready"),
            Self::Buffering => f.write_str("buffering"),
            Self::Playing => f.write_str("playing"),
            Self::Paused => f.write_str("paused"),
            Self::Ended => f.write_str("ended"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}

/// Normalized playback progress, `position / duration`
///
/// Unknown or zero durations yield `0.0`; the result is always within `[0.0, 1.0]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn progress(position_ms: u64, duration_ms: Option<u64>) -> f32 {
    match duration_ms {
        Some(duration) if duration > 0 => {
            ((position_ms as f64 / duration as f64) as f32).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}
