/// Seconds between two polls of the calendar
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Poll cycles between two reclamation passes
pub const DEFAULT_CLEANUP_EVERY: u32 = 20;

/// Lead time used when an event relies on the calendar's default reminders
pub const DEFAULT_REMINDER_MINUTES: i64 = 10;

/// Number of upcoming events fetched per poll
pub const DEFAULT_MAX_EVENTS: u32 = 10;

/// How long after its end an event stays tracked
pub const DEFAULT_GRACE_MINUTES: i64 = 120;

pub const DEFAULT_CALENDAR_ID: &str = "primary";
