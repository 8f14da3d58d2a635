//! Upstream event types.
//!
//! An [`UpcomingEvent`] is what the event source hands the watcher each poll
//! cycle. Time fields are kept exactly as the calendar service reported them,
//! so that any change in representation is visible to the integrity check.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{RemindError, RemindResult};
use crate::zone::DayZone;

/// An upcoming calendar event as reported by the event source.
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingEvent {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub window: EventWindow,
    pub reminders: ReminderConfig,
}

impl UpcomingEvent {
    /// Minutes from `now` until the event starts, negative once it has started.
    pub fn remaining_minutes(&self, now: DateTime<Utc>, zone: &DayZone) -> RemindResult<f64> {
        let start = self.window.start_instant(zone)?;
        Ok((start - now).num_milliseconds() as f64 / 60_000.0)
    }
}

/// Reminder configuration attached to an upstream event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderConfig {
    /// The calendar's default reminders apply
    pub use_default: bool,
    /// Explicit lead times in minutes, used when `use_default` is false
    pub overrides: Vec<i64>,
}

impl ReminderConfig {
    pub fn default_reminders() -> Self {
        ReminderConfig {
            use_default: true,
            overrides: Vec::new(),
        }
    }

    pub fn overrides(minutes: impl IntoIterator<Item = i64>) -> Self {
        ReminderConfig {
            use_default: false,
            overrides: minutes.into_iter().collect(),
        }
    }

    /// Lead-time offsets currently configured on the event.
    pub fn offsets(&self, default_minutes: i64) -> Vec<i64> {
        if self.use_default {
            vec![default_minutes]
        } else {
            self.overrides.clone()
        }
    }
}

/// The raw start/end fields of an event.
///
/// An event is either whole-day (date markers) or timed (RFC 3339 stamps),
/// never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventWindow {
    AllDay {
        start_date: String,
        end_date: String,
    },
    Timed {
        start_date_time: String,
        end_date_time: String,
    },
}

impl EventWindow {
    pub fn all_day(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        EventWindow::AllDay {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    pub fn timed(start_date_time: impl Into<String>, end_date_time: impl Into<String>) -> Self {
        EventWindow::Timed {
            start_date_time: start_date_time.into(),
            end_date_time: end_date_time.into(),
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, EventWindow::AllDay { .. })
    }

    pub fn start_date(&self) -> &str {
        match self {
            EventWindow::AllDay { start_date, .. } => start_date,
            EventWindow::Timed { .. } => "",
        }
    }

    pub fn end_date(&self) -> &str {
        match self {
            EventWindow::AllDay { end_date, .. } => end_date,
            EventWindow::Timed { .. } => "",
        }
    }

    pub fn start_date_time(&self) -> &str {
        match self {
            EventWindow::Timed {
                start_date_time, ..
            } => start_date_time,
            EventWindow::AllDay { .. } => "",
        }
    }

    pub fn end_date_time(&self) -> &str {
        match self {
            EventWindow::Timed { end_date_time, .. } => end_date_time,
            EventWindow::AllDay { .. } => "",
        }
    }

    /// The instant the event starts. Whole-day events start at midnight in `zone`.
    pub fn start_instant(&self, zone: &DayZone) -> RemindResult<DateTime<Utc>> {
        match self {
            EventWindow::AllDay { start_date, .. } => parse_day_start(start_date, zone),
            EventWindow::Timed {
                start_date_time, ..
            } => parse_date_time(start_date_time),
        }
    }

    /// The instant the event ends.
    ///
    /// A whole-day event ends at the end of its end date, i.e. midnight of
    /// the following day in `zone`.
    pub fn end_instant(&self, zone: &DayZone) -> RemindResult<DateTime<Utc>> {
        match self {
            EventWindow::AllDay { end_date, .. } => parse_day_end(end_date, zone),
            EventWindow::Timed { end_date_time, .. } => parse_date_time(end_date_time),
        }
    }
}

fn parse_date_time(value: &str) -> RemindResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RemindError::time_parse(value, e))
}

fn parse_date(value: &str) -> RemindResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| RemindError::time_parse(value, "expected YYYY-MM-DD"))
}

fn parse_day_start(value: &str, zone: &DayZone) -> RemindResult<DateTime<Utc>> {
    zone.start_of_day(parse_date(value)?)
        .ok_or_else(|| RemindError::time_parse(value, "midnight does not exist in this zone"))
}

fn parse_day_end(value: &str, zone: &DayZone) -> RemindResult<DateTime<Utc>> {
    let next = parse_date(value)?
        .succ_opt()
        .ok_or_else(|| RemindError::time_parse(value, "date out of range"))?;
    zone.start_of_day(next)
        .ok_or_else(|| RemindError::time_parse(value, "midnight does not exist in this zone"))
}
