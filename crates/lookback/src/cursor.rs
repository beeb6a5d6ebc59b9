//! Timeline cursor: the committed playback position plus the transient
//! preview shown while a drag gesture is in progress.
//!
//! The preview only ever affects what is displayed. Reloads are driven by
//! the committed value alone, which changes on drag release, calendar
//! steps, and direct go-to.

use chrono::{Days, Months, NaiveDateTime, NaiveTime, TimeDelta};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Calendar unit for the prev/next navigation controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepUnit {
    Day,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Back,
    Forward,
}

/// Map a timestamp to its position within `reference_day`, in `[0, 100)`.
/// Times outside the day clamp to the nearest edge.
pub fn to_percent(t: NaiveDateTime, reference_day: NaiveDateTime) -> f64 {
    let start = reference_day.date().and_time(NaiveTime::MIN);
    let secs = (t - start).num_seconds().clamp(0, 86_399) as f64;
    secs / SECONDS_PER_DAY * 100.0
}

/// Map a timeline percent back to a timestamp within `reference_day`.
/// Accepts `[0, 100]`; 100 lands on the following midnight.
pub fn from_percent(percent: f64, reference_day: NaiveDateTime) -> NaiveDateTime {
    let start = reference_day.date().and_time(NaiveTime::MIN);
    let secs = (percent.clamp(0.0, 100.0) / 100.0 * SECONDS_PER_DAY).round() as i64;
    start
        .checked_add_signed(TimeDelta::seconds(secs))
        .unwrap_or(start)
}

/// Committed/preview pair over the session timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeCursor {
    committed: NaiveDateTime,
    preview: Option<NaiveDateTime>,
}

impl TimeCursor {
    pub fn new(committed: NaiveDateTime) -> Self {
        Self {
            committed,
            preview: None,
        }
    }

    pub fn committed(&self) -> NaiveDateTime {
        self.committed
    }

    /// What the view shows: the preview while dragging, otherwise the
    /// committed position.
    pub fn display_time(&self) -> NaiveDateTime {
        self.preview.unwrap_or(self.committed)
    }

    pub fn is_dragging(&self) -> bool {
        self.preview.is_some()
    }

    /// Timeline position of the displayed time within its own day.
    pub fn percent(&self) -> f64 {
        let shown = self.display_time();
        to_percent(shown, shown)
    }

    /// Move the preview to a percent of the committed day. Display only.
    pub fn drag_to(&mut self, percent: f64) {
        self.preview = Some(from_percent(percent, self.committed));
    }

    /// End the drag, committing the final percent. Returns the new
    /// committed time.
    pub fn commit_percent(&mut self, percent: f64) -> NaiveDateTime {
        let t = from_percent(percent, self.committed);
        self.commit(t)
    }

    /// Commit an absolute time, clearing any preview.
    pub fn commit(&mut self, t: NaiveDateTime) -> NaiveDateTime {
        self.preview = None;
        self.committed = t;
        t
    }

    pub fn cancel_drag(&mut self) {
        self.preview = None;
    }

    /// Step the committed time by one calendar unit. Calendar arithmetic
    /// only; month steps saturate to the shorter month's last day.
    pub fn advance(&mut self, unit: StepUnit, direction: StepDirection) -> NaiveDateTime {
        let stepped = match (unit, direction) {
            (StepUnit::Day, StepDirection::Forward) => self.committed.checked_add_days(Days::new(1)),
            (StepUnit::Day, StepDirection::Back) => self.committed.checked_sub_days(Days::new(1)),
            (StepUnit::Month, StepDirection::Forward) => {
                self.committed.checked_add_months(Months::new(1))
            }
            (StepUnit::Month, StepDirection::Back) => {
                self.committed.checked_sub_months(Months::new(1))
            }
        };
        self.commit(stepped.unwrap_or(self.committed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(s: &str) -> NaiveDateTime {
        lookproto::timefmt::parse_wire(s).unwrap()
    }

    #[test]
    fn percent_round_trips_within_a_second() {
        let day = t("2024-01-01 12:00:00");
        for p in [0.0, 0.01, 12.5, 37.5, 50.0, 99.9988] {
            let back = to_percent(from_percent(p, day), day);
            let error_secs = (back - p).abs() / 100.0 * SECONDS_PER_DAY;
            assert!(error_secs <= 1.0, "percent {p} drifted by {error_secs}s");
        }
    }

    #[test]
    fn noon_is_halfway() {
        let day = t("2024-01-01 00:00:00");
        assert_eq!(to_percent(t("2024-01-01 12:00:00"), day), 50.0);
        assert_eq!(from_percent(50.0, day), t("2024-01-01 12:00:00"));
    }

    #[test]
    fn hundred_percent_is_the_following_midnight() {
        let day = t("2024-01-01 09:30:00");
        assert_eq!(from_percent(100.0, day), t("2024-01-02 00:00:00"));
    }

    #[test]
    fn out_of_day_times_clamp() {
        let day = t("2024-01-02 00:00:00");
        assert_eq!(to_percent(t("2024-01-01 23:00:00"), day), 0.0);
        assert!(to_percent(t("2024-01-03 01:00:00"), day) < 100.0);
    }

    #[test]
    fn dragging_never_moves_the_committed_time() {
        let mut cursor = TimeCursor::new(t("2024-01-01 09:00:00"));
        cursor.drag_to(75.0);
        assert!(cursor.is_dragging());
        assert_eq!(cursor.display_time(), t("2024-01-01 18:00:00"));
        assert_eq!(cursor.committed(), t("2024-01-01 09:00:00"));

        cursor.cancel_drag();
        assert_eq!(cursor.display_time(), t("2024-01-01 09:00:00"));
    }

    #[test]
    fn commit_clears_the_preview() {
        let mut cursor = TimeCursor::new(t("2024-01-01 09:00:00"));
        cursor.drag_to(10.0);
        let committed = cursor.commit_percent(25.0);
        assert_eq!(committed, t("2024-01-01 06:00:00"));
        assert!(!cursor.is_dragging());
        assert_eq!(cursor.committed(), committed);
    }

    #[test]
    fn calendar_steps_saturate_on_short_months() {
        let mut cursor = TimeCursor::new(t("2024-01-31 08:00:00"));
        cursor.advance(StepUnit::Month, StepDirection::Forward);
        assert_eq!(cursor.committed(), t("2024-02-29 08:00:00"));

        let mut cursor = TimeCursor::new(t("2024-03-01 08:00:00"));
        cursor.advance(StepUnit::Day, StepDirection::Back);
        assert_eq!(cursor.committed(), t("2024-02-29 08:00:00"));
    }
}
