//! Audio player controller

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::diagnostics::{DiagnosticContext, DiagnosticsSink, TracingDiagnostics};
use crate::error::PlayerError;
use crate::session::{MediaSession, SessionConnector, SessionEvent, SessionListener};
use crate::state::{EventBus, EventFilter, PlayerEvent, StateContainer};
use crate::types::{MediaItem, PlayerConfig, PlayerState, SessionPlaybackState, progress};

mod connection;
mod poller;

#[cfg(test)]
mod tests;

use connection::{ActiveSession, SessionConnection, establish};

const COMPONENT: &str = "AudioPlayerController";

/// Single point of control for playback
///
/// Owns the connection to the playback session, mirrors session events into
/// [`PlayerState`], and polls progress while playing. Cloning yields another
/// handle to the same controller; the composition root creates one and shares it.
///
/// Commands issued before the session is connected are dropped. Failures are
/// never returned to the caller; they surface as [`PlayerState::Error`].
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use playback_controller::testing::{MockConnector, MockSession};
/// use playback_controller::{AudioPlayerController, MediaItem, PlayerConfig, PlayerState};
///
/// # async fn example() -> Result<(), playback_controller::PlayerError> {
/// let session = Arc::new(MockSession::new());
/// let connector = Arc::new(MockConnector::with_session(session));
///
/// let controller = AudioPlayerController::new(PlayerConfig::default(), connector)?;
/// let mut state = controller.player_state();
///
/// controller.initialize();
/// let _ = state.wait_for(|s| *s == PlayerState::Ready).await;
///
/// controller.prepare_and_play(&MediaItem::new("ep-1", "episode1.mp3"));
/// controller.seek_to(15_000);
///
/// controller.release();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AudioPlayerController {
    inner: Arc<Inner>,
}

struct Inner {
    /// Configuration
    config: PlayerConfig,
    /// Performs the session handshake
    connector: Arc<dyn SessionConnector>,
    /// Receives absorbed failures
    diagnostics: Arc<dyn DiagnosticsSink>,
    /// Runtime all background tasks are spawned on
    runtime: Handle,
    /// Observable state
    state: StateContainer,
    /// Event bus
    events: EventBus,
    /// Connection slot
    connection: Mutex<SessionConnection>,
    /// Progress poller, present only while playing
    poller: Mutex<Option<JoinHandle<()>>>,
    /// Connection attempt counter
    attempts: AtomicU64,
}

impl AudioPlayerController {
    /// Create a controller on the current tokio runtime
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Config` if called outside a tokio runtime.
    pub fn new(
        config: PlayerConfig,
        connector: Arc<dyn SessionConnector>,
    ) -> Result<Self, PlayerError> {
        Self::builder(connector).config(config).build()
    }

    /// Create a controller builder
    #[must_use]
    pub fn builder(connector: Arc<dyn SessionConnector>) -> ControllerBuilder {
        ControllerBuilder {
            config: PlayerConfig::default(),
            connector,
            diagnostics: None,
            runtime: None,
        }
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &PlayerConfig {
        &self.inner.config
    }

    // === Lifecycle ===

    /// Start connecting to the playback session
    ///
    /// No-op while a connection is pending or established. The outcome arrives
    /// asynchronously as [`PlayerState::Ready`] or [`PlayerState::Error`].
    pub fn initialize(&self) {
        self.inner.initialize();
    }

    /// Tear down the session connection
    ///
    /// Stops progress polling, cancels a pending connection attempt, removes the
    /// session listener and releases the session. Safe to call repeatedly and
    /// without a prior `initialize()`. Leaves the state at [`PlayerState::Idle`].
    pub fn release(&self) {
        self.inner.release();
    }

    /// Check if a session connection is established
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.session().is_some()
    }

    // === Playback ===

    /// Load and play `item`, or keep playing it if it is already loaded
    ///
    /// If the session's current item has the same ID, an ended item restarts
    /// from the beginning and any other state resumes playback. Otherwise the
    /// item is resolved against the base URL, set on the session, prepared and
    /// played.
    pub fn prepare_and_play(&self, item: &MediaItem) {
        let Some(session) = self.inner.session() else {
            tracing::debug!(id = %item.id, "prepare_and_play dropped: no session connection");
            return;
        };

        if session.current_media_id().as_deref() == Some(item.id.as_str()) {
            if session.playback_state() == SessionPlaybackState::Ended {
                tracing::debug!(id = %item.id, "Restarting ended item");
                session.seek_to(0);
                session.play();
                self.inner.state.set_progress(0.0);
                self.inner.events.emit(PlayerEvent::Restarted {
                    id: item.id.clone(),
                });
            } else {
                session.play();
                self.inner.transition(PlayerState::Playing);
            }
            return;
        }

        let playable = item.to_playable(&self.inner.config.base_url);
        tracing::info!(id = %item.id, uri = %playable.uri, "Loading media item");
        session.set_media_item(playable);
        session.prepare();
        session.play();
        self.inner.state.set_progress(0.0);
        self.inner.events.emit(PlayerEvent::MediaItemLoaded {
            id: item.id.clone(),
        });
    }

    /// Resume playback
    ///
    /// State follows once the session reports that it is playing.
    pub fn play(&self) {
        match self.inner.session() {
            Some(session) => session.play(),
            None => tracing::debug!("play dropped: no session connection"),
        }
    }

    /// Pause playback
    ///
    /// State follows once the session reports that it stopped.
    pub fn pause(&self) {
        match self.inner.session() {
            Some(session) => session.pause(),
            None => tracing::debug!("pause dropped: no session connection"),
        }
    }

    /// Seek relative to the current position
    ///
    /// The target is clamped at zero. Progress for the target is published
    /// immediately rather than waiting for the next poll.
    pub fn seek_to(&self, offset_ms: i64) {
        let Some(session) = self.inner.session() else {
            tracing::debug!(offset_ms, "seek_to dropped: no session connection");
            return;
        };

        let target = session.current_position_ms().saturating_add_signed(offset_ms);
        session.seek_to(target);

        let value = progress(target, session.duration_ms());
        self.inner.state.set_progress(value);
        self.inner.events.emit(PlayerEvent::Seeked {
            position_ms: target,
            progress: value,
        });
    }

    // === Observation ===

    /// Subscribe to player state; the current value is available immediately
    #[must_use]
    pub fn player_state(&self) -> watch::Receiver<PlayerState> {
        self.inner.state.subscribe_state()
    }

    /// Subscribe to normalized progress in `[0.0, 1.0]`
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<f32> {
        self.inner.state.subscribe_progress()
    }

    /// Current player state
    #[must_use]
    pub fn current_state(&self) -> PlayerState {
        self.inner.state.state()
    }

    /// Current normalized progress
    #[must_use]
    pub fn current_progress(&self) -> f32 {
        self.inner.state.progress()
    }

    /// Subscribe to controller events
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.inner.events.subscribe()
    }

    /// Subscribe to state changes, loads, restarts and seeks
    #[must_use]
    pub fn subscribe_playback_events(&self) -> EventFilter {
        EventFilter::playback(self.inner.events.subscribe())
    }

    /// Subscribe to connection, failure and release events
    #[must_use]
    pub fn subscribe_connection_events(&self) -> EventFilter {
        EventFilter::connection(self.inner.events.subscribe())
    }
}

impl Inner {
    fn session(&self) -> Option<Arc<dyn MediaSession>> {
        self.connection.lock().session()
    }

    fn initialize(self: &Arc<Self>) {
        let mut connection = self.connection.lock();
        if !connection.is_disconnected() {
            tracing::debug!(
                connection = connection.describe(),
                "initialize ignored: connection already exists"
            );
            return;
        }

        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            token = %self.config.session_token,
            attempt,
            "Connecting to media session"
        );

        let weak = Arc::downgrade(self);
        let connector = self.connector.clone();
        let token = self.config.session_token.clone();
        let timeout = self.config.connection_timeout;

        let task = self.runtime.spawn(async move {
            let outcome = establish(connector, token, timeout).await;
            match weak.upgrade() {
                Some(inner) => inner.finish_connect(attempt, outcome),
                None => {
                    if let Ok(session) = outcome {
                        session.release();
                    }
                }
            }
        });

        *connection = SessionConnection::Connecting { attempt, task };
    }

    fn finish_connect(
        self: &Arc<Self>,
        attempt: u64,
        outcome: Result<Arc<dyn MediaSession>, PlayerError>,
    ) {
        let mut connection = self.connection.lock();
        if !connection.is_attempt(attempt) {
            tracing::debug!(attempt, "Discarding superseded connection attempt");
            if let Ok(session) = outcome {
                session.release();
            }
            return;
        }

        match outcome {
            Ok(session) => {
                tracing::info!(attempt, "Connected to media session");
                self.events.emit(PlayerEvent::Connected);
                // Ready must precede anything the session reports on registration
                self.publish(PlayerState::Ready);

                let (listener, rx) = SessionListener::channel();
                let listener = session.add_listener(listener);
                let pump = self.runtime.spawn(pump_events(Arc::downgrade(self), rx));
                *connection = SessionConnection::Connected(ActiveSession {
                    session,
                    listener,
                    pump,
                });
            }
            Err(error) => {
                *connection = SessionConnection::Disconnected;
                drop(connection);
                self.fail(&error);
            }
        }
    }

    /// Fold a connection failure into the error state
    fn fail(&self, error: &PlayerError) {
        let message = error.to_string();
        if matches!(error, PlayerError::Interrupted) {
            tracing::warn!("Media session connection interrupted");
            self.events.emit(PlayerEvent::ConnectionInterrupted);
        } else {
            tracing::error!(error = %message, "Media session connection failed");
        }

        let context =
            DiagnosticContext::new(&self.config.diagnostics_screen, COMPONENT, "initialize");
        self.diagnostics.record(error, &context);

        self.events.emit(PlayerEvent::ConnectionFailed {
            message: message.clone(),
        });
        self.settle(PlayerState::Error(message));
    }

    fn release(&self) {
        let previous =
            std::mem::replace(&mut *self.connection.lock(), SessionConnection::Disconnected);
        let released = previous.teardown();

        let mut poller = self.poller.lock();
        if let Some(handle) = poller.take() {
            handle.abort();
        }
        let old = self.state.reset();
        drop(poller);
        if old != PlayerState::Idle {
            self.events.emit(PlayerEvent::StateChanged {
                old,
                new: PlayerState::Idle,
            });
        }

        if released {
            tracing::info!("Media session released");
            self.events.emit(PlayerEvent::Released);
        }
    }

    /// Apply a session-driven state
    ///
    /// Dropped once the connection is gone. Entering `Playing` starts the
    /// progress poller; any other state stops it.
    fn transition(self: &Arc<Self>, new: PlayerState) {
        let mut poller = self.poller.lock();
        let Some(session) = self.session() else {
            tracing::debug!(state = %new, "Ignoring state change: no session connection");
            return;
        };

        if new.is_playing() {
            if poller.as_ref().is_none_or(JoinHandle::is_finished) {
                *poller = Some(self.runtime.spawn(poller::poll_progress(
                    Arc::downgrade(self),
                    session,
                    self.config.poll_interval,
                )));
            }
        } else if let Some(handle) = poller.take() {
            handle.abort();
        }

        self.publish(new);
    }

    /// Apply a state that ends the session-driven lifecycle
    fn settle(&self, new: PlayerState) {
        let mut poller = self.poller.lock();
        if let Some(handle) = poller.take() {
            handle.abort();
        }
        self.publish(new);
    }

    fn publish(&self, new: PlayerState) {
        let old = self.state.set_state(new.clone());
        if old != new {
            tracing::debug!(%old, %new, "Player state changed");
            self.events.emit(PlayerEvent::StateChanged { old, new });
        }
    }

    fn handle_session_event(self: &Arc<Self>, event: SessionEvent) {
        let Some(session) = self.session() else {
            return;
        };

        let next = match event {
            SessionEvent::IsPlayingChanged(is_playing) => Some(PlayerState::from_session(
                is_playing,
                session.playback_state(),
            )),
            SessionEvent::PlaybackStateChanged(SessionPlaybackState::Buffering) => {
                Some(PlayerState::Buffering)
            }
            SessionEvent::PlaybackStateChanged(SessionPlaybackState::Ended)
                if !session.is_playing() =>
            {
                Some(PlayerState::Ended)
            }
            SessionEvent::PlaybackStateChanged(SessionPlaybackState::Ready)
                if self.state.state() == PlayerState::Buffering =>
            {
                Some(PlayerState::from_session(
                    session.is_playing(),
                    SessionPlaybackState::Ready,
                ))
            }
            SessionEvent::PlaybackStateChanged(_) => None,
        };

        if let Some(next) = next {
            self.transition(next);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.poller.get_mut().take() {
            handle.abort();
        }
        let connection =
            std::mem::replace(self.connection.get_mut(), SessionConnection::Disconnected);
        connection.teardown();
    }
}

/// Apply session events in delivery order
async fn pump_events(inner: Weak<Inner>, mut rx: mpsc::UnboundedReceiver<SessionEvent>) {
    while let Some(event) = rx.recv().await {
        let Some(controller) = inner.upgrade() else {
            break;
        };
        tracing::trace!(?event, "Session event");
        controller.handle_session_event(event);
    }
    tracing::debug!("Session event stream closed");
}

/// Builder for [`AudioPlayerController`]
pub struct ControllerBuilder {
    config: PlayerConfig,
    connector: Arc<dyn SessionConnector>,
    diagnostics: Option<Arc<dyn DiagnosticsSink>>,
    runtime: Option<Handle>,
}

impl ControllerBuilder {
    /// Set configuration
    #[must_use]
    pub fn config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the sink for absorbed failures (default: [`TracingDiagnostics`])
    #[must_use]
    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Set the runtime background tasks run on (default: the current one)
    #[must_use]
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Build the controller
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Config` if no runtime was set and none is current.
    pub fn build(self) -> Result<AudioPlayerController, PlayerError> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|e| PlayerError::Config {
                message: "no tokio runtime available".to_string(),
                source: Some(Box::new(e)),
            })?,
        };

        Ok(AudioPlayerController {
            inner: Arc::new(Inner {
                config: self.config,
                connector: self.connector,
                diagnostics: self
                    .diagnostics
                    .unwrap_or_else(|| Arc::new(TracingDiagnostics)),
                runtime,
                state: StateContainer::new(),
                events: EventBus::new(),
                connection: Mutex::new(SessionConnection::Disconnected),
                poller: Mutex::new(None),
                attempts: AtomicU64::new(0),
            }),
        })
    }
}
