//! Transport seam between the session core and the archive backend.

pub mod http;

pub use http::HttpTransport;

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::error::PlayerError;
use lookproto::{Camera, StreamQuery};

/// Chunked media payload as delivered by the backend.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, PlayerError>> + Send>>;

/// One attached media source. Owns the open byte stream; dropping the
/// handle closes the underlying connection.
pub struct SourceHandle {
    url: String,
    content_type: Option<String>,
    stream: ByteStream,
}

impl SourceHandle {
    pub fn new(url: impl Into<String>, content_type: Option<String>, stream: ByteStream) -> Self {
        Self {
            url: url.into(),
            content_type,
            stream,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn into_stream(self) -> ByteStream {
        self.stream
    }
}

impl fmt::Debug for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceHandle")
            .field("url", &self.url)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// What the session core needs from the backend.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Open a time-addressed stream. Cancellation is dropping the future;
    /// the connection closes with it.
    async fn open_stream(&self, query: &StreamQuery) -> Result<SourceHandle, PlayerError>;

    /// Advise the backend to release its per-session stream resource.
    /// Callers treat this as one-way; the result only feeds logging.
    async fn stop_stream(&self) -> Result<(), PlayerError>;

    /// Fetch the camera directory listing. Used by frontends to pick a
    /// camera; the session itself never calls this.
    async fn list_cameras(&self) -> Result<Vec<Camera>, PlayerError>;
}
