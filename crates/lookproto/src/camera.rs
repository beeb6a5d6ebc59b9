//! Camera directory records and the backend's failure body.

use serde::{Deserialize, Serialize};

/// One camera archive directory as served by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: u32,
    pub name: String,
    pub video_dir: String,
}

/// Response body of `GET /api/cameras`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraList {
    #[serde(default)]
    pub cameras: Vec<Camera>,
}

/// JSON failure body attached to non-2xx responses.
///
/// `error` is a machine code (`MISSING_PARAMS`, `NO_VIDEO`,
/// `STREAM_ERROR`); `message` is the operator-facing text. Endpoints are
/// not consistent about sending both, so either may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Best-effort human-readable description, preferring the message text
    /// over the machine code.
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}
