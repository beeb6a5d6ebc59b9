//! Ownership of the single outstanding stream request.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::PlayerError;
use crate::transport::{SourceHandle, StreamTransport};
use lookproto::StreamQuery;

/// Outcome of one stream request, tagged with the generation that issued
/// it and the query it was built from.
#[derive(Debug)]
pub struct StreamResult {
    pub generation: u64,
    pub query: StreamQuery,
    pub outcome: Result<SourceHandle, PlayerError>,
}

/// Issues stream requests and guarantees at most one is live.
///
/// Every request gets a fresh generation. `cancel` both aborts the
/// transport future and bumps the generation, so a result that already
/// made it into the channel fails the [`complete`](Self::complete) check
/// and is dropped. Staleness is that one integer comparison; there are no
/// in-progress flags.
pub struct RequestLifecycle {
    transport: Arc<dyn StreamTransport>,
    results: mpsc::Sender<StreamResult>,
    generation: u64,
    inflight: Option<CancellationToken>,
}

impl RequestLifecycle {
    pub fn new(transport: Arc<dyn StreamTransport>, results: mpsc::Sender<StreamResult>) -> Self {
        Self {
            transport,
            results,
            generation: 0,
            inflight: None,
        }
    }

    /// The live generation. Only results tagged with this value may touch
    /// session state.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_inflight(&self) -> bool {
        self.inflight.is_some()
    }

    /// Cancel any outstanding request and issue a new one. Returns the new
    /// generation.
    pub fn start(&mut self, query: StreamQuery) -> u64 {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;

        let token = CancellationToken::new();
        let stop = token.clone();
        let transport = self.transport.clone();
        let results = self.results.clone();

        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = stop.cancelled() => {
                    debug!(generation, "stream request cancelled in flight");
                    return;
                }
                outcome = transport.open_stream(&query) => outcome,
            };
            if results
                .send(StreamResult {
                    generation,
                    query,
                    outcome,
                })
                .await
                .is_err()
            {
                debug!(generation, "result channel closed, dropping outcome");
            }
        });

        self.inflight = Some(token);
        generation
    }

    /// Abort the outstanding request, if any. Safe to call when idle.
    pub fn cancel(&mut self) {
        if let Some(token) = self.inflight.take() {
            token.cancel();
            // Invalidate anything the cancelled task already queued.
            self.generation += 1;
        }
    }

    /// Check a result's liveness and retire the in-flight slot when it is
    /// current. Stale results return false and must be dropped unapplied.
    pub fn complete(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.inflight = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lookproto::{Camera, PlaybackRate};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Transport stub whose stream requests park until released.
    struct ParkedTransport {
        release: Notify,
        opened: AtomicU32,
    }

    impl ParkedTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                release: Notify::new(),
                opened: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl StreamTransport for ParkedTransport {
        async fn open_stream(&self, query: &StreamQuery) -> Result<SourceHandle, PlayerError> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(SourceHandle::new(
                query.url("http://test"),
                None,
                Box::pin(futures::stream::empty()),
            ))
        }

        async fn stop_stream(&self) -> Result<(), PlayerError> {
            Ok(())
        }

        async fn list_cameras(&self) -> Result<Vec<Camera>, PlayerError> {
            Ok(Vec::new())
        }
    }

    fn query_at(hour: u32) -> StreamQuery {
        let start = lookproto::timefmt::parse_wire(&format!("2024-01-01 {hour:02}:00:00")).unwrap();
        StreamQuery::new("/data/cam1", start, PlaybackRate::Normal)
    }

    #[tokio::test]
    async fn only_the_newest_generation_delivers() {
        let transport = ParkedTransport::new();
        let (tx, mut rx) = mpsc::channel(8);
        let mut lifecycle = RequestLifecycle::new(transport.clone(), tx);

        let first = lifecycle.start(query_at(9));
        let second = lifecycle.start(query_at(10));
        assert!(second > first);

        // Release everything; only the second request may deliver.
        transport.release.notify_waiters();
        tokio::task::yield_now().await;
        transport.release.notify_waiters();

        let result = rx.recv().await.unwrap();
        assert_eq!(result.generation, second);
        assert!(lifecycle.complete(result.generation));

        // Nothing else arrives.
        let extra = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(extra.is_err());
    }

    #[tokio::test]
    async fn cancel_invalidates_an_outstanding_request() {
        let transport = ParkedTransport::new();
        let (tx, mut rx) = mpsc::channel(8);
        let mut lifecycle = RequestLifecycle::new(transport.clone(), tx);

        let generation = lifecycle.start(query_at(9));
        lifecycle.cancel();
        assert!(!lifecycle.has_inflight());
        assert!(!lifecycle.complete(generation));

        // A late transport completion must not deliver.
        transport.release.notify_waiters();
        let extra = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(extra.is_err());
    }

    #[tokio::test]
    async fn cancel_when_idle_is_a_no_op() {
        let transport = ParkedTransport::new();
        let (tx, _rx) = mpsc::channel(8);
        let mut lifecycle = RequestLifecycle::new(transport, tx);

        let before = lifecycle.generation();
        lifecycle.cancel();
        assert_eq!(lifecycle.generation(), before);
    }

    #[tokio::test]
    async fn stale_results_do_not_retire_the_live_request() {
        let transport = ParkedTransport::new();
        let (tx, _rx) = mpsc::channel(8);
        let mut lifecycle = RequestLifecycle::new(transport, tx);

        let old = lifecycle.start(query_at(9));
        let live = lifecycle.start(query_at(10));

        assert!(!lifecycle.complete(old));
        assert!(lifecycle.has_inflight());
        assert!(lifecycle.complete(live));
        assert!(!lifecycle.has_inflight());
    }
}
