//! Playback session state machine and driver.

mod controller;
mod types;

pub use controller::{SessionController, SessionOptions};
pub use types::{
    ExitTrigger, Intent, PlaybackSession, PlayerState, SessionFate, SessionSnapshot, SourceInfo,
};
