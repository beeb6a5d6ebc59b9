//! Playback rate selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rate requested from the stream endpoint when parsing fails.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("unsupported playback rate: {0}")]
pub struct UnsupportedRate(pub f64);

/// Playback speed multiplier.
///
/// The backend transcodes per request, so rates form a closed set rather
/// than a free float. The wire value is the bare number (`0.5`, `1`, `2`,
/// `4`) both in query strings and in JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum PlaybackRate {
    Half,
    #[default]
    Normal,
    Double,
    Quadruple,
}

impl PlaybackRate {
    pub const ALL: [PlaybackRate; 4] = [
        PlaybackRate::Half,
        PlaybackRate::Normal,
        PlaybackRate::Double,
        PlaybackRate::Quadruple,
    ];

    pub fn as_f64(self) -> f64 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::Double => 2.0,
            PlaybackRate::Quadruple => 4.0,
        }
    }

    /// Wire spelling, also used for display.
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackRate::Half => "0.5",
            PlaybackRate::Normal => "1",
            PlaybackRate::Double => "2",
            PlaybackRate::Quadruple => "4",
        }
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_f64() == value)
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = UnsupportedRate;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value).ok_or(UnsupportedRate(value))
    }
}

impl From<PlaybackRate> for f64 {
    fn from(rate: PlaybackRate) -> f64 {
        rate.as_f64()
    }
}

impl FromStr for PlaybackRate {
    type Err = UnsupportedRate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| UnsupportedRate(f64::NAN))?;
        Self::from_f64(value).ok_or(UnsupportedRate(value))
    }
}
