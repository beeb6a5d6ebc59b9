//! Headless media surface that consumes the stream and reports progress.
//!
//! Stands in for a real decoder: reads a small prefix of the byte stream
//! to announce metadata-ready/can-play, then keeps draining while playing.
//! Lets an operator smoke-test archive streams from a terminal without a
//! video pipeline.

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{MediaEvent, MediaSurface};
use crate::error::{MediaErrorCode, PlayerError};
use crate::transport::SourceHandle;
use lookproto::PlaybackRate;

/// Bytes read before announcing can-play.
const CAN_PLAY_PREFIX: u64 = 64 * 1024;

/// Progress event cadence, in bytes consumed.
const PROGRESS_STRIDE: u64 = 1024 * 1024;

pub struct ProbeSurface {
    events: tokio::sync::mpsc::Sender<MediaEvent>,
    gate: watch::Sender<bool>,
    reader: Option<CancellationToken>,
}

impl ProbeSurface {
    pub fn new(events: tokio::sync::mpsc::Sender<MediaEvent>) -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            events,
            gate,
            reader: None,
        }
    }
}

#[async_trait]
impl MediaSurface for ProbeSurface {
    async fn attach(&mut self, source: SourceHandle) -> Result<(), PlayerError> {
        self.release().await;

        let token = CancellationToken::new();
        let stop = token.clone();
        let events = self.events.clone();
        let mut gate = self.gate.subscribe();
        let url = source.url().to_string();
        let mut stream = source.into_stream();

        let _ = self.events.send(MediaEvent::LoadStart).await;

        tokio::spawn(async move {
            let mut total: u64 = 0;
            let mut next_progress = PROGRESS_STRIDE;
            let mut metadata_seen = false;
            let mut can_play_seen = false;

            loop {
                // The prefix is probed regardless of play state; after
                // that, consumption waits for the play gate.
                while can_play_seen && !*gate.borrow() {
                    tokio::select! {
                        _ = stop.cancelled() => return,
                        changed = gate.changed() => {
                            if changed.is_err() {
                                return;
                            }
                        }
                    }
                }

                let chunk = tokio::select! {
                    _ = stop.cancelled() => return,
                    chunk = stream.next() => chunk,
                };

                match chunk {
                    Some(Ok(bytes)) => {
                        total += bytes.len() as u64;
                        if !metadata_seen {
                            metadata_seen = true;
                            let _ = events.send(MediaEvent::MetadataReady).await;
                        }
                        if !can_play_seen && total >= CAN_PLAY_PREFIX {
                            can_play_seen = true;
                            let _ = events.send(MediaEvent::CanPlay).await;
                        }
                        if total >= next_progress {
                            next_progress += PROGRESS_STRIDE;
                            let _ = events.send(MediaEvent::Progress(total)).await;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(%url, error = %e, "stream read failed");
                        let _ = events.send(MediaEvent::Error(MediaErrorCode::Network)).await;
                        return;
                    }
                    None => {
                        // Short streams end inside the probe prefix; the
                        // whole thing is buffered, so it can play.
                        if metadata_seen && !can_play_seen {
                            let _ = events.send(MediaEvent::CanPlay).await;
                        }
                        debug!(%url, total, "stream drained");
                        return;
                    }
                }
            }
        });

        self.reader = Some(token);
        Ok(())
    }

    async fn play(&mut self) -> Result<(), PlayerError> {
        if self.reader.is_none() {
            return Err(PlayerError::Media(MediaErrorCode::Unknown));
        }
        let _ = self.gate.send(true);
        let _ = self.events.send(MediaEvent::Playing).await;
        Ok(())
    }

    async fn pause(&mut self) {
        let _ = self.gate.send(false);
        if self.reader.is_some() {
            let _ = self.events.send(MediaEvent::Paused).await;
        }
    }

    async fn set_rate(&mut self, rate: PlaybackRate) {
        // The backend bakes the rate into the stream; nothing to do here.
        debug!(%rate, "probe surface rate noted");
    }

    async fn release(&mut self) {
        if let Some(token) = self.reader.take() {
            token.cancel();
        }
        let _ = self.gate.send(false);
    }
}
