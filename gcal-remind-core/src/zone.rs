//! Time zone used to anchor whole-day events.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{RemindError, RemindResult};

/// The zone in which a whole-day event's date marker begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayZone {
    /// The system's local time zone
    #[default]
    Local,
    /// A named IANA zone (e.g. "America/New_York")
    Named(Tz),
}

impl DayZone {
    /// Parse an IANA zone name; `None` means the system zone.
    pub fn from_name(name: Option<&str>) -> RemindResult<Self> {
        match name {
            None => Ok(DayZone::Local),
            Some(name) => name
                .parse::<Tz>()
                .map(DayZone::Named)
                .map_err(|e| RemindError::Config(format!("Unknown time zone '{}': {}", name, e))),
        }
    }

    /// Midnight at the start of `date` in this zone, as a UTC instant.
    ///
    /// Returns `None` when midnight is skipped by a DST transition.
    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        match self {
            DayZone::Local => Local
                .from_local_datetime(&midnight)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            DayZone::Named(tz) => tz
                .from_local_datetime(&midnight)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}
