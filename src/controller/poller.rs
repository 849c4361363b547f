//! Progress polling while playing

use std::sync::{Arc, Weak};
use std::time::Duration;

use super::Inner;
use crate::session::MediaSession;
use crate::types::progress;

/// Publish `position / duration` every `interval` while the session plays
///
/// Session position is only available by asking, so this is the sole source of
/// progress updates apart from optimistic seeks. Ends on its own once the
/// controller is dropped; otherwise it runs until aborted.
pub(super) async fn poll_progress(
    inner: Weak<Inner>,
    session: Arc<dyn MediaSession>,
    interval: Duration,
) {
    loop {
        let Some(controller) = inner.upgrade() else {
            break;
        };
        if session.is_playing() {
            let value = progress(session.current_position_ms(), session.duration_ms());
            tracing::trace!(progress = value, "Progress tick");
            controller.state.set_progress(value);
        }
        drop(controller);

        tokio::time::sleep(interval).await;
    }
}
