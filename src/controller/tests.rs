use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use proptest::prelude::*;
use tokio::time::timeout;

use super::*;
use crate::diagnostics::DiagnosticContext;
use crate::testing::{ConnectOutcome, MockConnector, MockSession, SessionCommand, create_test_item};
use crate::types::SessionToken;

fn test_config() -> PlayerConfig {
    PlayerConfig::builder()
        .base_url("https://api.example.com/")
        .connection_timeout(None)
        .build()
}

fn controller_for(connector: &Arc<MockConnector>) -> AudioPlayerController {
    AudioPlayerController::new(test_config(), connector.clone()).unwrap()
}

async fn wait_state<F>(controller: &AudioPlayerController, pred: F) -> PlayerState
where
    F: FnMut(&PlayerState) -> bool,
{
    let mut rx = controller.player_state();
    let state = timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("state not reached in time")
        .expect("state channel closed");
    state.clone()
}

async fn wait_progress(controller: &AudioPlayerController, expected: f32) {
    let mut rx = controller.progress();
    timeout(
        Duration::from_secs(5),
        rx.wait_for(|p| (p - expected).abs() < 1e-6),
    )
    .await
    .expect("progress not reached in time")
    .expect("progress channel closed");
}

async fn connected(session: &Arc<MockSession>) -> (AudioPlayerController, Arc<MockConnector>) {
    let connector = Arc::new(MockConnector::with_session(session.clone()));
    let controller = controller_for(&connector);
    controller.initialize();
    wait_state(&controller, |s| *s == PlayerState::Ready).await;
    (controller, connector)
}

#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<(String, DiagnosticContext)>>,
}

impl DiagnosticsSink for RecordingSink {
    fn record(&self, error: &PlayerError, context: &DiagnosticContext) {
        self.records.lock().push((error.to_string(), context.clone()));
    }
}

// --- Connection ---

#[tokio::test]
async fn test_initialize_connects() {
    let session = Arc::new(MockSession::new());
    let connector = Arc::new(MockConnector::with_session(session.clone()));
    let controller = controller_for(&connector);
    let mut events = controller.subscribe_events();

    assert_eq!(controller.current_state(), PlayerState::Idle);
    assert!(!controller.is_connected());

    controller.initialize();
    wait_state(&controller, |s| *s == PlayerState::Ready).await;

    assert!(controller.is_connected());
    assert_eq!(session.listener_count(), 1);
    assert_eq!(connector.tokens(), vec![SessionToken::default()]);
    assert!(matches!(events.recv().await.unwrap(), PlayerEvent::Connected));
}

#[tokio::test]
async fn test_null_controller() {
    let connector = Arc::new(MockConnector::new(ConnectOutcome::Null));
    let sink = Arc::new(RecordingSink::default());
    let controller = AudioPlayerController::builder(connector.clone())
        .config(
            PlayerConfig::builder()
                .diagnostics_screen("PodcastDetail")
                .build(),
        )
        .diagnostics(sink.clone())
        .build()
        .unwrap();

    controller.initialize();
    let state = wait_state(&controller, |s| matches!(s, PlayerState::Error(_))).await;

    assert_eq!(
        state,
        PlayerState::Error("Failed to connect to MediaController: Controller is null.".to_string())
    );
    assert!(!controller.is_connected());

    let records = sink.records.lock();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].1,
        DiagnosticContext::new("PodcastDetail", "AudioPlayerController", "initialize")
    );
}

#[tokio::test]
async fn test_execution_failure() {
    let connector = Arc::new(MockConnector::new(ConnectOutcome::Fail(
        "service not found".to_string(),
    )));
    let controller = controller_for(&connector);

    controller.initialize();
    let state = wait_state(&controller, |s| matches!(s, PlayerState::Error(_))).await;

    assert_eq!(state.error_message(), Some("Connection error: service not found"));
}

#[tokio::test]
async fn test_interrupted_connection() {
    let connector = Arc::new(MockConnector::new(ConnectOutcome::Interrupted));
    let controller = controller_for(&connector);
    let mut events = controller.subscribe_events();

    controller.initialize();
    let state = wait_state(&controller, |s| matches!(s, PlayerState::Error(_))).await;

    assert_eq!(state.error_message(), Some("Connection interrupted."));
    // Interruption is announced before the failure itself
    assert!(matches!(
        events.recv().await.unwrap(),
        PlayerEvent::ConnectionInterrupted
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        PlayerEvent::ConnectionFailed { .. }
    ));
}

#[tokio::test]
async fn test_unexpected_failure() {
    let connector = Arc::new(MockConnector::new(ConnectOutcome::Unexpected(
        "binder died".to_string(),
    )));
    let controller = controller_for(&connector);

    controller.initialize();
    let state = wait_state(&controller, |s| matches!(s, PlayerState::Error(_))).await;

    assert_eq!(
        state.error_message(),
        Some("An unexpected error occurred during connection: binder died")
    );
}

#[tokio::test]
async fn test_panicking_connector() {
    let connector = Arc::new(MockConnector::new(ConnectOutcome::Panic(
        "boom".to_string(),
    )));
    let controller = controller_for(&connector);

    controller.initialize();
    let state = wait_state(&controller, |s| matches!(s, PlayerState::Error(_))).await;

    assert_eq!(
        state.error_message(),
        Some("An unexpected error occurred during connection: boom")
    );
}

#[tokio::test(start_paused = true)]
async fn test_connection_timeout() {
    let connector = Arc::new(MockConnector::new(ConnectOutcome::Null).gated());
    let controller = AudioPlayerController::new(
        PlayerConfig::builder()
            .connection_timeout(Some(Duration::from_secs(1)))
            .build(),
        connector.clone(),
    )
    .unwrap();

    controller.initialize();
    let state = wait_state(&controller, |s| matches!(s, PlayerState::Error(_))).await;

    assert_eq!(
        state.error_message(),
        Some("Connection error: timed out after 1s")
    );
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let session = Arc::new(MockSession::new());
    let connector = Arc::new(MockConnector::with_session(session.clone()).gated());
    let controller = controller_for(&connector);

    controller.initialize();
    controller.initialize();
    tokio::task::yield_now().await;
    assert_eq!(connector.attempts(), 1);

    connector.open_gate();
    wait_state(&controller, |s| *s == PlayerState::Ready).await;

    controller.initialize();
    tokio::task::yield_now().await;
    assert_eq!(connector.attempts(), 1);
    assert_eq!(session.listener_count(), 1);
}

#[tokio::test]
async fn test_initialize_retries_after_error() {
    let session = Arc::new(MockSession::new());
    let connector = Arc::new(MockConnector::new(ConnectOutcome::Fail(
        "refused".to_string(),
    )));
    let controller = controller_for(&connector);

    controller.initialize();
    wait_state(&controller, |s| matches!(s, PlayerState::Error(_))).await;

    connector.set_outcome(ConnectOutcome::Session(session.clone()));
    controller.initialize();
    wait_state(&controller, |s| *s == PlayerState::Ready).await;

    assert_eq!(connector.attempts(), 2);
    assert!(controller.is_connected());
}

#[test]
fn test_build_outside_runtime_fails() {
    let connector = Arc::new(MockConnector::new(ConnectOutcome::Null));
    let result = AudioPlayerController::new(PlayerConfig::default(), connector);
    assert!(matches!(result, Err(PlayerError::Config { .. })));
}

#[test]
fn test_build_with_explicit_runtime() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let session = Arc::new(MockSession::new());
    let connector = Arc::new(MockConnector::with_session(session));

    let controller = AudioPlayerController::builder(connector)
        .runtime(runtime.handle().clone())
        .build()
        .unwrap();

    controller.initialize();
    runtime.block_on(async {
        wait_state(&controller, |s| *s == PlayerState::Ready).await;
    });
}

// --- Release ---

#[tokio::test]
async fn test_release_without_initialize() {
    let connector = Arc::new(MockConnector::new(ConnectOutcome::Null));
    let controller = controller_for(&connector);

    controller.release();
    controller.release();

    assert_eq!(controller.current_state(), PlayerState::Idle);
    assert_eq!(connector.attempts(), 0);
}

#[tokio::test]
async fn test_release_is_idempotent() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    let mut events = controller.subscribe_events();

    controller.release();
    controller.release();

    assert_eq!(controller.current_state(), PlayerState::Idle);
    assert!(!controller.is_connected());
    assert!(session.is_released());
    assert_eq!(session.listener_count(), 0);
    assert_eq!(
        session
            .commands()
            .iter()
            .filter(|c| **c == SessionCommand::Release)
            .count(),
        1
    );

    let mut released = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, PlayerEvent::Released) {
            released += 1;
        }
    }
    assert_eq!(released, 1);
}

#[tokio::test]
async fn test_release_cancels_pending_connection() {
    let session = Arc::new(MockSession::new());
    let connector = Arc::new(MockConnector::with_session(session.clone()).gated());
    let controller = controller_for(&connector);

    controller.initialize();
    tokio::task::yield_now().await;
    assert_eq!(connector.attempts(), 1);

    controller.release();
    connector.open_gate();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(controller.current_state(), PlayerState::Idle);
    assert!(!controller.is_connected());
    assert_eq!(session.listener_count(), 0);

    // A fresh attempt is allowed after release
    controller.initialize();
    connector.open_gate();
    wait_state(&controller, |s| *s == PlayerState::Ready).await;
    assert_eq!(connector.attempts(), 2);
}

#[tokio::test]
async fn test_release_resets_progress() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    session.set_position(10_000);
    session.set_duration(Some(20_000));
    controller.seek_to(0);
    assert!(controller.current_progress() > 0.0);

    controller.release();

    assert!(controller.current_progress().abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_drop_releases_session() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;

    drop(controller);

    assert!(session.is_released());
    assert_eq!(session.listener_count(), 0);
}

// --- Commands ---

#[tokio::test]
async fn test_commands_dropped_when_disconnected() {
    let session = Arc::new(MockSession::new());
    let connector = Arc::new(MockConnector::with_session(session.clone()));
    let controller = controller_for(&connector);

    controller.play();
    controller.pause();
    controller.seek_to(5_000);
    controller.prepare_and_play(&create_test_item("ep-1"));

    assert!(session.commands().is_empty());
    assert_eq!(controller.current_state(), PlayerState::Idle);
    assert!(controller.current_progress().abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_play_pause_forward_without_state_change() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;

    controller.play();
    controller.pause();

    assert_eq!(
        session.commands(),
        vec![SessionCommand::Play, SessionCommand::Pause]
    );
    assert_eq!(controller.current_state(), PlayerState::Ready);
}

#[tokio::test]
async fn test_prepare_and_play_new_item() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    let mut events = controller.subscribe_events();

    controller.prepare_and_play(&create_test_item("ep-1"));

    let commands = session.commands();
    assert_eq!(commands.len(), 3);
    let SessionCommand::SetMediaItem(item) = &commands[0] else {
        panic!("expected SetMediaItem, got {:?}", commands[0]);
    };
    assert_eq!(item.media_id, "ep-1");
    assert_eq!(item.uri, "https://api.example.com/audios/ep-1.mp3");
    assert_eq!(
        item.metadata.artwork_uri.as_deref(),
        Some("https://api.example.com/images/ep-1.png")
    );
    assert_eq!(commands[1], SessionCommand::Prepare);
    assert_eq!(commands[2], SessionCommand::Play);

    assert!(matches!(
        events.recv().await.unwrap(),
        PlayerEvent::MediaItemLoaded { id } if id == "ep-1"
    ));
}

#[tokio::test]
async fn test_prepare_and_play_same_item_while_playing() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    let item = create_test_item("ep-1");

    controller.prepare_and_play(&item);
    session.set_playing(true);
    wait_state(&controller, |s| *s == PlayerState::Playing).await;
    session.clear_commands();

    controller.prepare_and_play(&item);

    assert_eq!(session.commands(), vec![SessionCommand::Play]);
    assert_eq!(controller.current_state(), PlayerState::Playing);
}

#[tokio::test]
async fn test_prepare_and_play_restarts_ended_item() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    let item = create_test_item("ep-1");

    controller.prepare_and_play(&item);
    session.set_position(60_000);
    session.set_playback_state_silently(SessionPlaybackState::Ended);
    session.set_playing(false);
    wait_state(&controller, |s| *s == PlayerState::Ended).await;
    session.clear_commands();

    controller.prepare_and_play(&item);

    assert_eq!(
        session.commands(),
        vec![SessionCommand::SeekTo(0), SessionCommand::Play]
    );
}

#[tokio::test]
async fn test_prepare_and_play_resumes_paused_item() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    let item = create_test_item("ep-1");

    controller.prepare_and_play(&item);
    session.set_playing(true);
    wait_state(&controller, |s| *s == PlayerState::Playing).await;
    session.set_playing(false);
    wait_state(&controller, |s| *s == PlayerState::Paused).await;
    session.clear_commands();

    controller.prepare_and_play(&item);

    assert_eq!(session.commands(), vec![SessionCommand::Play]);
    assert_eq!(controller.current_state(), PlayerState::Playing);
}

#[tokio::test]
async fn test_prepare_and_play_switches_item() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;

    controller.prepare_and_play(&create_test_item("ep-1"));
    session.clear_commands();
    controller.prepare_and_play(&create_test_item("ep-2"));

    let commands = session.commands();
    assert!(matches!(&commands[0], SessionCommand::SetMediaItem(item) if item.media_id == "ep-2"));
    assert_eq!(&commands[1..], &[SessionCommand::Prepare, SessionCommand::Play]);
}

// --- Seeking ---

#[tokio::test]
async fn test_seek_is_relative_and_optimistic() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    session.set_position(10_000);
    session.set_duration(Some(20_000));

    controller.seek_to(5_000);

    assert_eq!(session.commands(), vec![SessionCommand::SeekTo(15_000)]);
    assert!((controller.current_progress() - 0.75).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_seek_clamps_at_zero() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    session.set_position(3_000);
    session.set_duration(Some(20_000));

    controller.seek_to(-10_000);

    assert_eq!(session.commands(), vec![SessionCommand::SeekTo(0)]);
    assert!(controller.current_progress().abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_seek_with_unknown_duration() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    session.set_position(3_000);
    session.set_duration(None);

    controller.seek_to(1_000);

    let value = controller.current_progress();
    assert!(value.is_finite());
    assert!(value.abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_seek_emits_event() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    session.set_position(30_000);
    session.set_duration(Some(60_000));
    let mut events = controller.subscribe_events();

    controller.seek_to(-15_000);

    match events.recv().await.unwrap() {
        PlayerEvent::Seeked {
            position_ms,
            progress,
        } => {
            assert_eq!(position_ms, 15_000);
            assert!((progress - 0.25).abs() < f32::EPSILON);
        }
        other => panic!("Wrong event type: {other:?}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_seek_progress_clamped(
        offsets in proptest::collection::vec(-200_000i64..200_000, 1..20),
        duration in prop_oneof![Just(None), Just(Some(0u64)), (1u64..500_000).prop_map(Some)],
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let session = Arc::new(MockSession::new());
            let (controller, _connector) = connected(&session).await;
            session.set_duration(duration);

            for offset in offsets {
                controller.seek_to(offset);
                let value = controller.current_progress();
                assert!(value.is_finite());
                assert!((0.0..=1.0).contains(&value));
                if duration.is_none_or(|d| d == 0) {
                    assert!(value.abs() < f32::EPSILON);
                }
            }
        });
    }
}

// --- State machine ---

#[tokio::test]
async fn test_session_events_drive_state() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;

    session.set_playing(true);
    wait_state(&controller, |s| *s == PlayerState::Playing).await;

    session.set_playing(false);
    wait_state(&controller, |s| *s == PlayerState::Paused).await;

    session.set_playback_state(SessionPlaybackState::Buffering);
    wait_state(&controller, |s| *s == PlayerState::Buffering).await;

    session.set_playing(true);
    wait_state(&controller, |s| *s == PlayerState::Playing).await;

    session.set_playback_state_silently(SessionPlaybackState::Ended);
    session.set_playing(false);
    wait_state(&controller, |s| *s == PlayerState::Ended).await;
}

#[tokio::test]
async fn test_ready_after_buffering_rederives_state() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;

    session.set_playing(true);
    wait_state(&controller, |s| *s == PlayerState::Playing).await;
    session.set_playback_state(SessionPlaybackState::Buffering);
    wait_state(&controller, |s| *s == PlayerState::Buffering).await;

    session.set_playback_state(SessionPlaybackState::Ready);
    wait_state(&controller, |s| *s == PlayerState::Playing).await;
}

#[tokio::test]
async fn test_ended_playback_state_event() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;

    session.set_playback_state(SessionPlaybackState::Ended);
    wait_state(&controller, |s| *s == PlayerState::Ended).await;
}

#[tokio::test]
async fn test_state_change_events() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    let mut events = controller.subscribe_events();

    session.set_playing(true);

    match events.recv().await.unwrap() {
        PlayerEvent::StateChanged { old, new } => {
            assert_eq!(old, PlayerState::Ready);
            assert_eq!(new, PlayerState::Playing);
        }
        other => panic!("Wrong event type: {other:?}"),
    }
}

#[tokio::test]
async fn test_playback_event_subscription() {
    let session = Arc::new(MockSession::responsive());
    session.set_duration(Some(20_000));
    let connector = Arc::new(MockConnector::with_session(session.clone()));
    let controller = controller_for(&connector);
    let mut playback = controller.subscribe_playback_events();

    controller.initialize();
    wait_state(&controller, |s| *s == PlayerState::Ready).await;
    controller.prepare_and_play(&create_test_item("ep-1"));
    wait_state(&controller, |s| *s == PlayerState::Playing).await;
    controller.release();

    let mut seen = Vec::new();
    while let Some(event) = playback.try_recv() {
        assert!(event.is_playback(), "unexpected {event:?}");
        seen.push(event);
    }
    assert!(seen.iter().any(|e| matches!(e, PlayerEvent::MediaItemLoaded { id } if id == "ep-1")));
    assert!(seen.iter().any(|e| matches!(
        e,
        PlayerEvent::StateChanged {
            new: PlayerState::Idle,
            ..
        }
    )));
}

#[tokio::test]
async fn test_connection_event_subscription() {
    let session = Arc::new(MockSession::new());
    let connector = Arc::new(MockConnector::with_session(session.clone()));
    let controller = controller_for(&connector);
    let mut connection = controller.subscribe_connection_events();

    controller.initialize();
    wait_state(&controller, |s| *s == PlayerState::Ready).await;
    session.set_playing(true);
    wait_state(&controller, |s| *s == PlayerState::Playing).await;
    controller.release();

    assert!(matches!(connection.recv().await, Some(PlayerEvent::Connected)));
    assert!(matches!(connection.recv().await, Some(PlayerEvent::Released)));
    assert!(connection.try_recv().is_none());
}

#[tokio::test]
async fn test_release_publishes_idle_transition() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    let mut events = controller.subscribe_events();

    controller.release();

    match events.recv().await.unwrap() {
        PlayerEvent::StateChanged { old, new } => {
            assert_eq!(old, PlayerState::Ready);
            assert_eq!(new, PlayerState::Idle);
        }
        other => panic!("Wrong event type: {other:?}"),
    }
    assert!(matches!(events.recv().await.unwrap(), PlayerEvent::Released));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_report_on_registration_is_not_overwritten_by_ready() {
    for _ in 0..50 {
        let session = Arc::new(MockSession::new().reporting_on_attach());
        session.set_position(10_000);
        session.set_duration(Some(40_000));
        session.set_playing(true);
        let connector = Arc::new(MockConnector::with_session(session.clone()));
        let controller = controller_for(&connector);

        controller.initialize();
        wait_state(&controller, |s| *s == PlayerState::Playing).await;
        wait_progress(&controller, 0.25).await;

        // Nothing may move it back to Ready or stop the poller
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(controller.current_state(), PlayerState::Playing);
        assert!(controller.inner.poller.lock().is_some());
        controller.release();
    }
}

#[tokio::test]
async fn test_events_after_release_are_ignored() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;

    controller.release();
    session.set_playing(true);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(controller.current_state(), PlayerState::Idle);
}

// --- Progress polling ---

#[tokio::test(start_paused = true)]
async fn test_poller_publishes_progress() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    session.set_position(30_000);
    session.set_duration(Some(60_000));

    session.set_playing(true);
    wait_state(&controller, |s| *s == PlayerState::Playing).await;
    wait_progress(&controller, 0.5).await;

    session.set_position(45_000);
    wait_progress(&controller, 0.75).await;
}

#[tokio::test(start_paused = true)]
async fn test_poller_stops_when_leaving_playing() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    session.set_position(30_000);
    session.set_duration(Some(60_000));

    session.set_playing(true);
    wait_progress(&controller, 0.5).await;

    // Still playing from the session's point of view, but no longer `Playing`
    session.set_playback_state(SessionPlaybackState::Buffering);
    wait_state(&controller, |s| *s == PlayerState::Buffering).await;

    session.set_position(45_000);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!((controller.current_progress() - 0.5).abs() < f32::EPSILON);

    // Re-entering `Playing` restarts it
    session.set_playback_state(SessionPlaybackState::Ready);
    wait_state(&controller, |s| *s == PlayerState::Playing).await;
    wait_progress(&controller, 0.75).await;
}

#[tokio::test(start_paused = true)]
async fn test_poller_stops_on_release() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    session.set_position(30_000);
    session.set_duration(Some(60_000));
    session.set_playing(true);
    wait_progress(&controller, 0.5).await;

    controller.release();
    // Pretend the engine keeps reporting; nothing may publish anymore
    session.set_position(45_000);
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(controller.current_progress().abs() < f32::EPSILON);
    assert!(controller.inner.poller.lock().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_poller_runs_only_while_playing() {
    let session = Arc::new(MockSession::new());
    let (controller, _connector) = connected(&session).await;
    assert!(controller.inner.poller.lock().is_none());

    session.set_playing(true);
    wait_state(&controller, |s| *s == PlayerState::Playing).await;
    assert!(controller.inner.poller.lock().is_some());

    session.set_playing(false);
    wait_state(&controller, |s| *s == PlayerState::Paused).await;
    assert!(controller.inner.poller.lock().is_none());
}
