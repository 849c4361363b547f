//! Mock playback session
//!
//! Records every command it receives and lets tests drive the state the
//! controller queries and the events it listens to.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::session::{ListenerId, MediaSession, SessionEvent, SessionListener};
use crate::types::{PlayableItem, SessionPlaybackState};

/// A command received by [`MockSession`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// `play()`
    Play,
    /// `pause()`
    Pause,
    /// `seek_to(position_ms)`
    SeekTo(u64),
    /// `set_media_item(item)`
    SetMediaItem(PlayableItem),
    /// `prepare()`
    Prepare,
    /// `release()`
    Release,
}

#[derive(Debug, Default)]
struct SessionSnapshot {
    is_playing: bool,
    playback_state: SessionPlaybackState,
    position_ms: u64,
    duration_ms: Option<u64>,
    current_media_id: Option<String>,
    commands: Vec<SessionCommand>,
    released: bool,
}

/// In-memory playback session
#[derive(Debug, Default)]
pub struct MockSession {
    snapshot: Mutex<SessionSnapshot>,
    listeners: Mutex<HashMap<ListenerId, SessionListener>>,
    /// Whether `play`/`pause` change `is_playing` and notify listeners
    auto_respond: bool,
    /// Whether a new listener is told the current playing flag at once
    report_on_attach: bool,
}

impl MockSession {
    /// Create a session that only records commands
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that reacts to `play`/`pause` like a real engine
    #[must_use]
    pub fn responsive() -> Self {
        Self {
            auto_respond: true,
            ..Self::default()
        }
    }

    /// Report the current playing flag to each listener as it registers
    #[must_use]
    pub fn reporting_on_attach(mut self) -> Self {
        self.report_on_attach = true;
        self
    }

    /// Commands received so far
    #[must_use]
    pub fn commands(&self) -> Vec<SessionCommand> {
        self.snapshot.lock().commands.clone()
    }

    /// Forget recorded commands
    pub fn clear_commands(&self) {
        self.snapshot.lock().commands.clear();
    }

    /// Number of registered listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Whether `release()` was called
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.snapshot.lock().released
    }

    /// Set the playing flag and report it to listeners
    pub fn set_playing(&self, is_playing: bool) {
        self.snapshot.lock().is_playing = is_playing;
        self.notify(SessionEvent::IsPlayingChanged(is_playing));
    }

    /// Set the playback state and report it to listeners
    pub fn set_playback_state(&self, state: SessionPlaybackState) {
        self.snapshot.lock().playback_state = state;
        self.notify(SessionEvent::PlaybackStateChanged(state));
    }

    /// Set the playback state without reporting it
    pub fn set_playback_state_silently(&self, state: SessionPlaybackState) {
        self.snapshot.lock().playback_state = state;
    }

    /// Set the current position
    pub fn set_position(&self, position_ms: u64) {
        self.snapshot.lock().position_ms = position_ms;
    }

    /// Set the current item's duration
    pub fn set_duration(&self, duration_ms: Option<u64>) {
        self.snapshot.lock().duration_ms = duration_ms;
    }

    /// Set the current item's media ID
    pub fn set_current_media_id(&self, id: Option<&str>) {
        self.snapshot.lock().current_media_id = id.map(str::to_string);
    }

    fn notify(&self, event: SessionEvent) {
        // Listener queues are unbounded; delivery never blocks the caller
        for listener in self.listeners.lock().values() {
            listener.notify(event);
        }
    }

    fn record(&self, command: SessionCommand) {
        self.snapshot.lock().commands.push(command);
    }
}

impl MediaSession for MockSession {
    fn add_listener(&self, listener: SessionListener) -> ListenerId {
        let id = ListenerId::new();
        if self.report_on_attach {
            let is_playing = self.snapshot.lock().is_playing;
            listener.notify(SessionEvent::IsPlayingChanged(is_playing));
        }
        self.listeners.lock().insert(id, listener);
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.lock().remove(&id);
    }

    fn play(&self) {
        self.record(SessionCommand::Play);
        if self.auto_respond {
            self.set_playing(true);
        }
    }

    fn pause(&self) {
        self.record(SessionCommand::Pause);
        if self.auto_respond {
            self.set_playing(false);
        }
    }

    fn seek_to(&self, position_ms: u64) {
        let mut snapshot = self.snapshot.lock();
        snapshot.commands.push(SessionCommand::SeekTo(position_ms));
        snapshot.position_ms = position_ms;
        if position_ms == 0 && snapshot.playback_state == SessionPlaybackState::Ended {
            snapshot.playback_state = SessionPlaybackState::Ready;
        }
    }

    fn set_media_item(&self, item: PlayableItem) {
        let mut snapshot = self.snapshot.lock();
        snapshot.current_media_id = Some(item.media_id.clone());
        snapshot.position_ms = 0;
        snapshot.commands.push(SessionCommand::SetMediaItem(item));
    }

    fn prepare(&self) {
        let mut snapshot = self.snapshot.lock();
        snapshot.commands.push(SessionCommand::Prepare);
        snapshot.playback_state = SessionPlaybackState::Ready;
    }

    fn release(&self) {
        let mut snapshot = self.snapshot.lock();
        snapshot.commands.push(SessionCommand::Release);
        snapshot.released = true;
        snapshot.is_playing = false;
    }

    fn is_playing(&self) -> bool {
        self.snapshot.lock().is_playing
    }

    fn playback_state(&self) -> SessionPlaybackState {
        self.snapshot.lock().playback_state
    }

    fn current_position_ms(&self) -> u64 {
        self.snapshot.lock().position_ms
    }

    fn duration_ms(&self) -> Option<u64> {
        self.snapshot.lock().duration_ms
    }

    fn current_media_id(&self) -> Option<String> {
        self.snapshot.lock().current_media_id.clone()
    }
}
