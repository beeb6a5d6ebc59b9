//! Stream request descriptor.

use chrono::NaiveDateTime;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::rate::PlaybackRate;
use crate::timefmt;

pub const STREAM_PATH: &str = "/api/video/stream";
pub const STOP_PATH: &str = "/api/video/stop";
pub const CAMERAS_PATH: &str = "/api/cameras";

/// Characters the frontend's encoder leaves verbatim; everything else is
/// percent-escaped, so spaces come out as `%20` and slashes as `%2F`.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Parameters for one time-addressable stream request.
///
/// Building a query is deterministic: two queries built from the same
/// inputs compare equal, which lets the player recognize a reload that
/// would fetch the stream it already has.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamQuery {
    pub video_dir: String,
    pub start_time: NaiveDateTime,
    pub rate: PlaybackRate,
}

impl StreamQuery {
    pub fn new(video_dir: impl Into<String>, start_time: NaiveDateTime, rate: PlaybackRate) -> Self {
        Self {
            video_dir: video_dir.into(),
            start_time,
            rate,
        }
    }

    /// Encoded query string, without the leading `?`.
    pub fn query_string(&self) -> String {
        format!(
            "start_time={}&video_dir={}&playback_rate={}",
            enc(&timefmt::format_wire(self.start_time)),
            enc(&self.video_dir),
            self.rate,
        )
    }

    /// Full request URL against a base like `http://host:5001`.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}{}?{}",
            base_url.trim_end_matches('/'),
            STREAM_PATH,
            self.query_string()
        )
    }
}

fn enc(s: &str) -> String {
    utf8_percent_encode(s, QUERY).to_string()
}
