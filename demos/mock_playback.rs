//! Drive a controller against the in-memory playback service
//!
//! Run with `RUST_LOG=debug cargo run --example mock_playback` to see the
//! controller's logs.

use std::sync::Arc;
use std::time::Duration;

use playback_controller::testing::{MockConnector, MockSession, create_test_item};
use playback_controller::{AudioPlayerController, PlayerConfig, PlayerEvent, PlayerState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let session = Arc::new(MockSession::responsive());
    session.set_duration(Some(4_000));
    let connector = Arc::new(MockConnector::with_session(session.clone()));

    let config = PlayerConfig::builder()
        .base_url("https://cdn.example.com/")
        .poll_interval(Duration::from_millis(100))
        .build();
    let player = AudioPlayerController::new(config, connector)?;

    let mut events = player.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let PlayerEvent::StateChanged { old, new } = event {
                println!("state: {old} -> {new}");
            }
        }
    });

    let mut state = player.player_state();
    player.initialize();
    state.wait_for(|s| *s != PlayerState::Idle).await?;

    if let PlayerState::Error(message) = player.current_state() {
        println!("connection failed: {message}");
        return Ok(());
    }

    player.prepare_and_play(&create_test_item("demo"));

    // Stand in for the engine advancing through the file
    for position in (0..=4_000).step_by(500) {
        session.set_position(position);
        tokio::time::sleep(Duration::from_millis(150)).await;
        println!("progress: {:>5.1}%", player.current_progress() * 100.0);
    }

    player.seek_to(-2_000);
    println!("after seek: {:>5.1}%", player.current_progress() * 100.0);

    player.pause();
    state.wait_for(|s| *s == PlayerState::Paused).await?;

    player.release();
    println!("final state: {}", player.current_state());
    Ok(())
}
