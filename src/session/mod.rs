//! Media session collaborator interface
//!
//! The playback engine lives outside this crate. A [`SessionConnector`] performs
//! the connection handshake and yields a [`MediaSession`] handle; the handle
//! accepts commands, answers synchronous queries, and reports events to any
//! registered [`SessionListener`].

mod events;
mod traits;


pub use events::{ListenerId, SessionEvent, SessionListener};
pub use traits::{MediaSession, SessionConnector};
