//! Wire contract shared by the Lookback player core and its frontends.
//!
//! Everything the archive backend and the player must agree on lives here:
//! the camera record, the closed set of playback rates, the stream request
//! descriptor, the timestamp format used in query strings, and the JSON
//! error body attached to failed responses.

pub mod camera;
pub mod query;
pub mod rate;
pub mod timefmt;

pub use camera::{Camera, CameraList, ErrorBody};
pub use query::{StreamQuery, CAMERAS_PATH, STOP_PATH, STREAM_PATH};
pub use rate::{PlaybackRate, UnsupportedRate};
