//! Idempotent session cleanup, shared by every exit path.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::lifecycle::RequestLifecycle;
use crate::media::MediaSurface;
use crate::scheduler::ReloadScheduler;
use crate::session::{PlaybackSession, PlayerState};
use crate::transport::StreamTransport;

/// Tell the backend to release its per-session stream. Advisory only:
/// fire and forget, log failures, never block the caller.
pub(crate) fn notify_stop(transport: &Arc<dyn StreamTransport>) {
    let transport = transport.clone();
    tokio::spawn(async move {
        if let Err(e) = transport.stop_stream().await {
            warn!(error = %e, "backend stream stop failed");
        }
    });
}

/// Borrows a session's parts and releases them in a fixed order: pending
/// reload, in-flight request, backend stream (advisory), media source,
/// then the state record itself.
///
/// Running it twice in a row is safe; every step is a no-op once its
/// resource is gone, and the stop notify is skipped when nothing was
/// streaming.
pub struct Teardown<'a, M: MediaSurface> {
    pub scheduler: &'a mut ReloadScheduler,
    pub lifecycle: &'a mut RequestLifecycle,
    pub transport: &'a Arc<dyn StreamTransport>,
    pub media: &'a mut M,
    pub session: &'a mut PlaybackSession,
}

impl<M: MediaSurface> Teardown<'_, M> {
    pub async fn run(self) {
        self.scheduler.cancel();

        let was_streaming = self.session.source.is_some() || self.lifecycle.has_inflight();
        self.lifecycle.cancel();

        if was_streaming {
            notify_stop(self.transport);
        }

        self.media.release().await;

        self.session.source = None;
        self.session.error = None;
        self.session.buffering = false;
        self.session.cursor.cancel_drag();
        self.session.state = PlayerState::Idle;
        debug!("session reset to idle");
    }
}
