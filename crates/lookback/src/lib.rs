//! Playback session core for browsing archived camera footage.
//!
//! The archive backend serves one stream per session, addressed by start
//! time. This crate owns the session state machine that turns operator
//! intents (play, scrub, rate changes, calendar steps) into a correctly
//! sequenced, cancellable series of stream requests, and guarantees
//! resource cleanup on every exit path.
//!
//! The pieces:
//!
//! - [`cursor::TimeCursor`] - committed vs. preview timeline position
//! - [`scheduler::ReloadScheduler`] - trailing-edge debounce for reloads
//! - [`lifecycle::RequestLifecycle`] - the single in-flight request and
//!   its generation counter
//! - [`session::SessionController`] - the state machine and driver loop
//! - [`teardown::Teardown`] - idempotent resource release
//! - [`transport`] / [`media`] - seams to the backend and the host player

pub mod cursor;
pub mod error;
pub mod lifecycle;
pub mod media;
pub mod scheduler;
pub mod session;
pub mod teardown;
pub mod telemetry;
pub mod transport;

pub use error::{MediaErrorCode, PlayerError};
pub use session::{
    ExitTrigger, Intent, SessionController, SessionFate, SessionOptions, SessionSnapshot,
};
