//! Error taxonomy for the playback session.

use std::fmt;
use thiserror::Error;

/// Host media failure classes, mapped from the numeric codes the media
/// primitive reports (1 = load interrupted, 2 = network, 3 = decode,
/// 4 = source format not supported).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorCode {
    Interrupted,
    Network,
    Decode,
    Unsupported,
    Unknown,
}

impl MediaErrorCode {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => MediaErrorCode::Interrupted,
            2 => MediaErrorCode::Network,
            3 => MediaErrorCode::Decode,
            4 => MediaErrorCode::Unsupported,
            _ => MediaErrorCode::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaErrorCode::Interrupted => "playback interrupted",
            MediaErrorCode::Network => "network failure while buffering",
            MediaErrorCode::Decode => "could not decode stream",
            MediaErrorCode::Unsupported => "stream format not supported",
            MediaErrorCode::Unknown => "unknown media failure",
        }
    }
}

impl fmt::Display for MediaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failures a playback session can surface.
///
/// `Aborted` marks a request that was cancelled on purpose; the controller
/// swallows it silently and it is never stored on the session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlayerError {
    /// Transport failure, or a non-2xx response without a usable body.
    #[error("network error: {0}")]
    Network(String),

    /// Failure reported by the backend's JSON error body.
    #[error("{0}")]
    Server(String),

    /// The media surface could not play the attached stream.
    #[error("media error: {0}")]
    Media(MediaErrorCode),

    /// The request was cancelled on purpose.
    #[error("request aborted")]
    Aborted,
}

impl PlayerError {
    pub fn is_abort(&self) -> bool {
        matches!(self, PlayerError::Aborted)
    }
}
