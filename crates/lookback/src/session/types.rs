//! Session records and the messages that drive them.

use chrono::NaiveDateTime;

use crate::cursor::{StepDirection, StepUnit, TimeCursor};
use crate::error::PlayerError;
use lookproto::PlaybackRate;

/// Lifecycle of a playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Error,
}

impl PlayerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Loading => "loading",
            PlayerState::Ready => "ready",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Error => "error",
        }
    }
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata about the currently attached source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub url: String,
    pub generation: u64,
}

/// Everything the controller mutates for one camera session.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    /// Archive directory being browsed; fixed for the session's lifetime.
    pub camera_dir: String,
    pub cursor: TimeCursor,
    pub rate: PlaybackRate,
    pub state: PlayerState,
    pub source: Option<SourceInfo>,
    pub error: Option<PlayerError>,
    /// Display-only stall indicator fed by the surface's waiting/loading
    /// events; no effect on the state machine.
    pub buffering: bool,
}

impl PlaybackSession {
    pub fn new(camera_dir: String, start: NaiveDateTime, rate: PlaybackRate) -> Self {
        Self {
            camera_dir,
            cursor: TimeCursor::new(start),
            rate,
            state: PlayerState::Idle,
            source: None,
            error: None,
            buffering: false,
        }
    }
}

/// User intents a view can send.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    PlayPause,
    SetRate(PlaybackRate),
    /// Calendar navigation; commits immediately.
    Step {
        unit: StepUnit,
        direction: StepDirection,
    },
    /// Timeline drag in progress; moves only the preview.
    DragTo(f64),
    /// Drag released at a percent; commits.
    DragCommit(f64),
    DragCancel,
    /// Jump straight to an absolute time; commits.
    GoTo(NaiveDateTime),
}

/// Environment signals that require releasing session resources. Any of
/// them can fire without the others, so each is wired independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitTrigger {
    /// Explicit back-navigation out of the player.
    Navigation,
    VisibilityHidden,
    FocusLost,
    Unmounting,
}

/// Whether the session survives an exit trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFate {
    Continue,
    Shutdown,
}

/// Render-ready snapshot published after every mutation; the single
/// source of truth for what a view shows.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: PlayerState,
    pub committed_time: NaiveDateTime,
    /// Preview while dragging, committed time otherwise.
    pub display_time: NaiveDateTime,
    pub timeline_percent: f64,
    pub rate: PlaybackRate,
    pub dragging: bool,
    pub buffering: bool,
    pub generation: u64,
    pub source_url: Option<String>,
    pub error: Option<String>,
}
