//! One poll cycle over the registry.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::RemindConfig;
use crate::error::RemindResult;
use crate::event::UpcomingEvent;
use crate::fire_window::FireWindow;
use crate::notifier::Notifier;
use crate::registry::ReminderRegistry;
use crate::zone::DayZone;

/// What a poll cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub events: usize,
    pub fired: usize,
    /// `Some` when a reclamation pass ran this cycle
    pub reclaimed: Option<usize>,
}

/// Drives the registry through poll cycles.
///
/// The watcher owns its registry for its whole lifetime; nothing else reads
/// or writes it.
#[derive(Debug)]
pub struct Watcher {
    registry: ReminderRegistry,
    fire_window: FireWindow,
    default_reminder_minutes: i64,
    cleanup_every: u32,
    cycles_since_cleanup: u32,
    grace: chrono::Duration,
    zone: DayZone,
}

impl Watcher {
    pub fn new(config: &RemindConfig) -> RemindResult<Self> {
        config.validate()?;

        Ok(Watcher {
            registry: ReminderRegistry::new(),
            fire_window: config.fire_window(),
            default_reminder_minutes: config.default_reminder_minutes,
            cleanup_every: config.cleanup_every,
            cycles_since_cleanup: 0,
            grace: config.grace(),
            zone: config.zone()?,
        })
    }

    pub fn registry(&self) -> &ReminderRegistry {
        &self.registry
    }

    pub fn zone(&self) -> &DayZone {
        &self.zone
    }

    pub fn default_reminder_minutes(&self) -> i64 {
        self.default_reminder_minutes
    }

    /// Run integrity check, reminder sync and fire evaluation for every
    /// event, then reclaim past events if a clean-up is due.
    pub fn run_cycle<N: Notifier + ?Sized>(
        &mut self,
        events: &[UpcomingEvent],
        now: DateTime<Utc>,
        notifier: &N,
    ) -> CycleReport {
        let mut report = CycleReport {
            events: events.len(),
            ..CycleReport::default()
        };

        for event in events {
            self.registry.check_integrity(event);

            let offsets = event.reminders.offsets(self.default_reminder_minutes);
            self.registry.sync_reminders(event, &offsets);

            match event.remaining_minutes(now, &self.zone) {
                Ok(remaining) => {
                    report.fired +=
                        self.registry
                            .evaluate(event, remaining, self.fire_window, notifier);
                }
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "Skipping reminders for event with unparseable start");
                }
            }
        }

        self.cycles_since_cleanup += 1;
        if self.cycles_since_cleanup >= self.cleanup_every {
            self.cycles_since_cleanup = 0;
            let reclaimed = self.registry.reclaim(now, self.grace, &self.zone);
            debug!(reclaimed, tracked = self.registry.len(), "Garbage collection issued");
            report.reclaimed = Some(reclaimed);
        }

        debug!(?report, tracked = self.registry.len(), "Poll cycle finished");
        report
    }
}
