use anyhow::Result;
use chrono::{DateTime, Utc};
use gcal_remind_core::UpcomingEvent;

/// Where upcoming events come from.
pub trait EventSource {
    /// Up to `max_results` events that have not ended by `now`, ordered by start.
    async fn upcoming(&mut self, now: DateTime<Utc>, max_results: u32) -> Result<Vec<UpcomingEvent>>;
}
