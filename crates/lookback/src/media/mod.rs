//! Host media surface abstraction.
//!
//! The session core never talks to a concrete player. It drives whatever
//! implements [`MediaSurface`] and receives the surface's events on a
//! channel, mirroring the attach/play/pause/release half of a video
//! element without depending on one.

pub mod probe;

pub use probe::ProbeSurface;

use async_trait::async_trait;

use crate::error::{MediaErrorCode, PlayerError};
use crate::transport::SourceHandle;
use lookproto::PlaybackRate;

/// Events a media surface reports back to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// The surface started loading an attached source.
    LoadStart,
    /// Enough of the stream arrived to know what it is.
    MetadataReady,
    /// Playback could start now.
    CanPlay,
    Playing,
    Paused,
    /// Starved for data; playback stalled.
    Waiting,
    /// Monotone buffering progress, in surface-defined units.
    Progress(u64),
    Error(MediaErrorCode),
}

/// The host's media playback primitive.
///
/// A session owns exactly one surface and is its only writer; the attached
/// source is replaced only after the previous one has been released.
#[async_trait]
pub trait MediaSurface: Send {
    /// Take ownership of a source and start loading it. Any previously
    /// attached source is released first.
    async fn attach(&mut self, source: SourceHandle) -> Result<(), PlayerError>;

    async fn play(&mut self) -> Result<(), PlayerError>;

    async fn pause(&mut self);

    async fn set_rate(&mut self, rate: PlaybackRate);

    /// Detach and fully release the attached source. No-op when nothing
    /// is attached.
    async fn release(&mut self);
}
