//! The playback session state machine and its driver loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use super::types::{
    ExitTrigger, Intent, PlaybackSession, PlayerState, SessionFate, SessionSnapshot, SourceInfo,
};
use crate::error::PlayerError;
use crate::lifecycle::{RequestLifecycle, StreamResult};
use crate::media::{MediaEvent, MediaSurface};
use crate::scheduler::ReloadScheduler;
use crate::teardown::Teardown;
use crate::transport::StreamTransport;
use lookproto::{Camera, PlaybackRate, StreamQuery};

/// Tuning for a new session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Quiet period for collapsing bursts of scrub and rate changes.
    pub quiet_period: Duration,
    /// Initial playback rate.
    pub rate: PlaybackRate,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(500),
            rate: PlaybackRate::Normal,
        }
    }
}

const RESULT_CHANNEL_CAPACITY: usize = 8;

/// One camera session: reacts to user intents, media surface events,
/// stream results, and environment exit triggers, and owns the media
/// surface and the single in-flight request.
///
/// Views observe it through the snapshot watch channel; nothing else is
/// allowed to touch the surface or its source.
pub struct SessionController<M: MediaSurface> {
    session: PlaybackSession,
    lifecycle: RequestLifecycle,
    scheduler: ReloadScheduler,
    transport: Arc<dyn StreamTransport>,
    media: M,
    results: Option<mpsc::Receiver<StreamResult>>,
    snapshot: watch::Sender<SessionSnapshot>,
    /// Set when the current load was started by a play press; Ready then
    /// continues straight into Playing.
    resume_on_ready: bool,
    /// Query whose stream is currently attached. A reload resolving to
    /// the same query while the session is healthy is skipped.
    applied_query: Option<StreamQuery>,
}

impl<M: MediaSurface> SessionController<M> {
    pub fn new(
        camera: &Camera,
        start: NaiveDateTime,
        transport: Arc<dyn StreamTransport>,
        media: M,
        options: SessionOptions,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);
        let session = PlaybackSession::new(camera.video_dir.clone(), start, options.rate);
        let (snapshot, _) = watch::channel(snapshot_of(&session, 0));

        Self {
            lifecycle: RequestLifecycle::new(transport.clone(), results_tx),
            scheduler: ReloadScheduler::new(options.quiet_period),
            transport,
            media,
            session,
            results: Some(results_rx),
            snapshot,
            resume_on_ready: false,
            applied_query: None,
        }
    }

    /// Observe render-ready session snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn generation(&self) -> u64 {
        self.lifecycle.generation()
    }

    /// When the pending reload fires, if any. Exposed for the driver.
    pub fn reload_deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    /// Take the stream-result receiver (can only be taken once). The
    /// driver owns it; direct-driving tests may take it instead.
    pub fn take_results(&mut self) -> Option<mpsc::Receiver<StreamResult>> {
        self.results.take()
    }

    /// Drive the session until an exit trigger or a closed intent channel
    /// ends it. One logical event loop; every mutation happens here.
    pub async fn run(
        mut self,
        mut intents: mpsc::Receiver<Intent>,
        mut media_events: mpsc::Receiver<MediaEvent>,
        mut exits: mpsc::Receiver<ExitTrigger>,
    ) {
        let Some(mut results) = self.take_results() else {
            return;
        };

        loop {
            let reload_armed = self.scheduler.is_armed();
            let reload_deadline = self
                .reload_deadline()
                .unwrap_or_else(|| Instant::now() + Duration::from_secs(60));

            tokio::select! {
                intent = intents.recv() => match intent {
                    Some(intent) => self.handle_intent(intent).await,
                    // The view dropped its handle; treat as unmount.
                    None => break,
                },
                Some(event) = media_events.recv() => self.handle_media_event(event).await,
                Some(result) = results.recv() => self.handle_stream_result(result).await,
                Some(trigger) = exits.recv() => {
                    if self.handle_exit(trigger).await == SessionFate::Shutdown {
                        return;
                    }
                }
                _ = sleep_until(reload_deadline), if reload_armed => {
                    self.fire_reload().await;
                }
            }
        }

        self.teardown().await;
    }

    /// Apply one user intent.
    pub async fn handle_intent(&mut self, intent: Intent) {
        debug!(?intent, state = %self.session.state, "intent");
        match intent {
            Intent::PlayPause => self.toggle_playback().await,
            Intent::SetRate(rate) => self.change_rate(rate).await,
            Intent::Step { unit, direction } => {
                self.session.cursor.advance(unit, direction);
                self.scheduler.schedule();
            }
            Intent::DragTo(percent) => self.session.cursor.drag_to(percent),
            Intent::DragCommit(percent) => {
                self.session.cursor.commit_percent(percent);
                self.scheduler.schedule();
            }
            Intent::DragCancel => self.session.cursor.cancel_drag(),
            Intent::GoTo(time) => {
                self.session.cursor.commit(time);
                self.scheduler.schedule();
            }
        }
        self.publish();
    }

    async fn toggle_playback(&mut self) {
        match self.session.state {
            // Not queued: another press once loading settles.
            PlayerState::Loading => debug!("play ignored while loading"),
            PlayerState::Playing => {
                self.media.pause().await;
                self.session.state = PlayerState::Paused;
            }
            PlayerState::Ready | PlayerState::Paused => match self.media.play().await {
                Ok(()) => self.session.state = PlayerState::Playing,
                Err(e) => self.fail(e).await,
            },
            // Play with no source is a commit action: load right away,
            // and continue into playback once the stream is usable.
            PlayerState::Idle | PlayerState::Error => {
                self.resume_on_ready = true;
                self.begin_load().await;
            }
        }
    }

    async fn change_rate(&mut self, rate: PlaybackRate) {
        if rate == self.session.rate {
            return;
        }
        info!(%rate, "playback rate changed");
        self.session.rate = rate;
        self.media.set_rate(rate).await;
        self.scheduler.schedule();
    }

    /// The debounce fired: reload from the current committed time and
    /// rate. Skipped when the attached stream already matches.
    pub async fn fire_reload(&mut self) {
        self.scheduler.cancel();

        let query = self.current_query();
        if self.is_healthy() && self.applied_query.as_ref() == Some(&query) {
            debug!("reload skipped, attached stream already matches");
            return;
        }

        self.resume_on_ready = false;
        self.begin_load().await;
        self.publish();
    }

    fn is_healthy(&self) -> bool {
        matches!(
            self.session.state,
            PlayerState::Ready | PlayerState::Playing | PlayerState::Paused
        )
    }

    fn current_query(&self) -> StreamQuery {
        StreamQuery::new(
            self.session.camera_dir.clone(),
            self.session.cursor.committed(),
            self.session.rate,
        )
    }

    /// Hard reset into Loading: the backend is time-addressable only at
    /// stream start, so any committed change replaces the whole stream.
    async fn begin_load(&mut self) {
        self.scheduler.cancel();
        self.reset_source().await;
        self.session.error = None;
        self.session.buffering = true;
        self.session.state = PlayerState::Loading;

        let query = self.current_query();
        let generation = self.lifecycle.start(query);
        debug!(
            generation,
            start_time = %self.session.cursor.committed(),
            rate = %self.session.rate,
            "stream request issued"
        );
    }

    /// Release whatever is attached or in flight before a new request.
    async fn reset_source(&mut self) {
        let was_streaming = self.session.source.is_some() || self.lifecycle.has_inflight();
        self.lifecycle.cancel();
        if was_streaming {
            crate::teardown::notify_stop(&self.transport);
        }
        self.media.release().await;
        self.session.source = None;
        self.applied_query = None;
    }

    /// Apply the outcome of a stream request, or drop it when stale.
    pub async fn handle_stream_result(&mut self, result: StreamResult) {
        if !self.lifecycle.complete(result.generation) {
            // The handle, if any, drops here and closes its connection.
            debug!(
                generation = result.generation,
                live = self.lifecycle.generation(),
                "discarding stale stream result"
            );
            return;
        }

        match result.outcome {
            Ok(source) => {
                let info = SourceInfo {
                    url: source.url().to_string(),
                    generation: result.generation,
                };
                match self.media.attach(source).await {
                    Ok(()) => {
                        debug!(url = %info.url, "source attached");
                        self.session.source = Some(info);
                        self.applied_query = Some(result.query);
                        // Still Loading; the surface's metadata-ready or
                        // can-play event moves the session to Ready.
                    }
                    Err(e) => self.fail(e).await,
                }
            }
            Err(e) if e.is_abort() => debug!("stream request aborted"),
            Err(e) => self.fail(e).await,
        }
        self.publish();
    }

    /// Apply one media surface event.
    pub async fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::LoadStart => self.session.buffering = true,
            MediaEvent::MetadataReady | MediaEvent::CanPlay => {
                self.session.buffering = false;
                if self.session.state == PlayerState::Loading && self.session.source.is_some() {
                    self.session.state = PlayerState::Ready;
                    if std::mem::take(&mut self.resume_on_ready) {
                        match self.media.play().await {
                            Ok(()) => self.session.state = PlayerState::Playing,
                            Err(e) => self.fail(e).await,
                        }
                    }
                }
            }
            MediaEvent::Playing => {
                self.session.buffering = false;
                if matches!(
                    self.session.state,
                    PlayerState::Ready | PlayerState::Paused
                ) {
                    self.session.state = PlayerState::Playing;
                }
            }
            MediaEvent::Paused => {
                if self.session.state == PlayerState::Playing {
                    self.session.state = PlayerState::Paused;
                }
            }
            MediaEvent::Waiting => self.session.buffering = true,
            MediaEvent::Progress(units) => {
                tracing::trace!(units, "buffer progress");
            }
            MediaEvent::Error(code) => {
                if self.session.state != PlayerState::Idle {
                    self.fail(PlayerError::Media(code)).await;
                }
            }
        }
        self.publish();
    }

    /// Every failure lands here: release the source, record the error,
    /// stop anything scheduled. Recovery is user-initiated only.
    async fn fail(&mut self, error: PlayerError) {
        warn!(%error, "session failed");
        self.scheduler.cancel();
        self.lifecycle.cancel();
        self.media.release().await;
        self.session.source = None;
        self.applied_query = None;
        self.resume_on_ready = false;
        self.session.buffering = false;
        self.session.error = Some(error);
        self.session.state = PlayerState::Error;
    }

    /// React to an environment exit trigger. Every trigger runs the full
    /// teardown; navigation and unmount also end the session.
    pub async fn handle_exit(&mut self, trigger: ExitTrigger) -> SessionFate {
        info!(?trigger, "exit trigger");
        self.teardown().await;
        match trigger {
            ExitTrigger::Navigation | ExitTrigger::Unmounting => SessionFate::Shutdown,
            ExitTrigger::VisibilityHidden | ExitTrigger::FocusLost => SessionFate::Continue,
        }
    }

    /// Release every resource and reset to Idle. Safe to call repeatedly.
    pub async fn teardown(&mut self) {
        Teardown {
            scheduler: &mut self.scheduler,
            lifecycle: &mut self.lifecycle,
            transport: &self.transport,
            media: &mut self.media,
            session: &mut self.session,
        }
        .run()
        .await;
        self.resume_on_ready = false;
        self.applied_query = None;
        self.publish();
    }

    fn publish(&self) {
        let _ = self
            .snapshot
            .send_replace(snapshot_of(&self.session, self.lifecycle.generation()));
    }
}

fn snapshot_of(session: &PlaybackSession, generation: u64) -> SessionSnapshot {
    SessionSnapshot {
        state: session.state,
        committed_time: session.cursor.committed(),
        display_time: session.cursor.display_time(),
        timeline_percent: session.cursor.percent(),
        rate: session.rate,
        dragging: session.cursor.is_dragging(),
        buffering: session.buffering,
        generation,
        source_url: session.source.as_ref().map(|s| s.url.clone()),
        error: session.error.as_ref().map(|e| e.to_string()),
    }
}
