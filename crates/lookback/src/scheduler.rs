//! Trailing-edge debounce for reload triggers.

use std::time::Duration;
use tokio::time::Instant;

/// Collapses bursts of reload triggers into one fire after a quiet period.
///
/// Holds only a deadline; the driver loop sleeps on it. Rearming replaces
/// the deadline, so only the quiet period after the last trigger counts.
/// Whoever fires reads the session's *current* committed time and rate,
/// never values captured when the trigger happened.
#[derive(Debug)]
pub struct ReloadScheduler {
    quiet_period: Duration,
    deadline: Option<Instant>,
}

impl ReloadScheduler {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            deadline: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Arm the timer, replacing any pending deadline.
    pub fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.quiet_period);
    }

    /// Clear any pending deadline. Must run during teardown.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
