//! Core types

mod config;
mod media;
mod state;


pub use config::{PlayerConfig, PlayerConfigBuilder, SessionToken};
pub use media::{MediaItem, MediaMetadata, PlayableItem, artwork_url, audio_url};
pub use state::{PlayerState, SessionPlaybackState, progress};
