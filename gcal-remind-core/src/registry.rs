//! The reminder registry.
//!
//! One [`EventRecord`] per tracked event id. Each poll cycle the watcher runs,
//! per event and in this order: [`ReminderRegistry::check_integrity`],
//! [`ReminderRegistry::sync_reminders`] and [`ReminderRegistry::evaluate`].
//! [`ReminderRegistry::reclaim`] runs every few cycles and is the only place
//! records are removed.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::event::{EventWindow, UpcomingEvent};
use crate::fire_window::FireWindow;
use crate::notifier::{NotificationRequest, Notifier};
use crate::zone::DayZone;

/// Fire state of one lead-time offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderState {
    /// Minutes before the start at which to remind
    pub lead_minutes: i64,
    /// Whether the notification for this edition of the event was sent
    pub fired: bool,
}

impl ReminderState {
    fn pending(lead_minutes: i64) -> Self {
        ReminderState {
            lead_minutes,
            fired: false,
        }
    }

    /// Minutes until this reminder's crossing point.
    pub fn minutes_until(&self, remaining_minutes: f64) -> f64 {
        remaining_minutes - self.lead_minutes as f64
    }
}

/// A tracked event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: String,
    pub summary: String,
    pub window: EventWindow,
    reminders: Vec<ReminderState>,
}

impl EventRecord {
    fn new(event: &UpcomingEvent) -> Self {
        EventRecord {
            id: event.id.clone(),
            summary: event.summary.clone(),
            window: event.window.clone(),
            reminders: Vec::new(),
        }
    }

    /// Tracked reminders, in the order they were added.
    pub fn reminders(&self) -> &[ReminderState] {
        &self.reminders
    }

    pub fn reminder(&self, lead_minutes: i64) -> Option<&ReminderState> {
        self.reminders.iter().find(|r| r.lead_minutes == lead_minutes)
    }

    /// Whether any tracked reminder has yet to fire.
    pub fn has_pending(&self) -> bool {
        self.reminders.iter().any(|r| !r.fired)
    }

    fn add_offset(&mut self, lead_minutes: i64) -> bool {
        if self.reminder(lead_minutes).is_some() {
            return false;
        }
        self.reminders.push(ReminderState::pending(lead_minutes));
        true
    }
}

/// Registry of tracked events, keyed by event id.
#[derive(Debug, Default)]
pub struct ReminderRegistry {
    records: HashMap<String, EventRecord>,
}

impl ReminderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&EventRecord> {
        self.records.get(id)
    }

    pub fn records(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.values()
    }

    /// Reconcile a tracked record with the event's current time fields.
    ///
    /// If any raw field changed the event is a new edition: its time fields
    /// are replaced and every reminder, fired or not, is dropped. Returns
    /// whether the record was reset. Untracked ids are left alone.
    pub fn check_integrity(&mut self, event: &UpcomingEvent) -> bool {
        let Some(record) = self.records.get_mut(&event.id) else {
            return false;
        };

        if record.window == event.window {
            return false;
        }

        debug!(
            event_id = %event.id,
            old = ?record.window,
            new = ?event.window,
            "Event time changed, resetting reminders"
        );
        record.window = event.window.clone();
        record.summary = event.summary.clone();
        record.reminders.clear();
        true
    }

    /// Add any offsets not yet tracked for the event, creating its record on
    /// first observation.
    ///
    /// Existing reminders are never removed or reset here, even if the event
    /// no longer lists their offset. Returns the number of offsets added.
    pub fn sync_reminders(&mut self, event: &UpcomingEvent, offsets: &[i64]) -> usize {
        let record = self
            .records
            .entry(event.id.clone())
            .or_insert_with(|| EventRecord::new(event));

        offsets
            .iter()
            .filter(|&&lead_minutes| record.add_offset(lead_minutes))
            .count()
    }

    /// Fire every unfired reminder of the event whose crossing lies inside
    /// `window`, marking it fired. Returns the number of notifications sent.
    pub fn evaluate<N: Notifier + ?Sized>(
        &mut self,
        event: &UpcomingEvent,
        remaining_minutes: f64,
        window: FireWindow,
        notifier: &N,
    ) -> usize {
        let Some(record) = self.records.get_mut(&event.id) else {
            return 0;
        };

        let mut fired = 0;
        for reminder in record.reminders.iter_mut().filter(|r| !r.fired) {
            if !window.contains(reminder.minutes_until(remaining_minutes)) {
                continue;
            }

            info!(
                event_id = %event.id,
                summary = %event.summary,
                lead_minutes = reminder.lead_minutes,
                remaining_minutes,
                "Reminder due"
            );
            notifier.notify(NotificationRequest {
                summary: event.summary.clone(),
                description: event.description.clone().unwrap_or_default(),
                lead_minutes: remaining_minutes.trunc() as i64,
            });
            reminder.fired = true;
            fired += 1;
        }

        fired
    }

    /// Drop records whose end lies more than `grace` before `now`.
    ///
    /// Fired state is not consulted. Records whose end cannot be parsed are
    /// logged and kept. Returns the number of records removed.
    pub fn reclaim(&mut self, now: DateTime<Utc>, grace: Duration, zone: &DayZone) -> usize {
        let before = self.records.len();

        self.records.retain(|id, record| match record.window.end_instant(zone) {
            Ok(end) => now - end <= grace,
            Err(e) => {
                warn!(event_id = %id, error = %e, "Garbage collection: keeping record with unparseable end");
                true
            }
        });

        let removed = before - self.records.len();
        if removed > 0 {
            debug!(removed, remaining = self.records.len(), "Reclaimed past events");
        }
        removed
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::event::ReminderConfig;
    use chrono::TimeZone;
    use chrono_tz::Tz;
    use std::cell::RefCell;

    /// Notifier that records every request.
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub(crate) sent: RefCell<Vec<NotificationRequest>>,
    }

    impl RecordingNotifier {
        pub(crate) fn count(&self) -> usize {
            self.sent.borrow().len()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, request: NotificationRequest) {
            self.sent.borrow_mut().push(request);
        }
    }

    fn timed_event(id: &str, start: &str, end: &str, offsets: &[i64]) -> UpcomingEvent {
        UpcomingEvent {
            id: id.to_string(),
            summary: format!("{} summary", id),
            description: Some(format!("{} description", id)),
            window: EventWindow::timed(start, end),
            reminders: ReminderConfig::overrides(offsets.iter().copied()),
        }
    }

    fn all_day_event(id: &str, start: &str, end: &str, offsets: &[i64]) -> UpcomingEvent {
        UpcomingEvent {
            window: EventWindow::all_day(start, end),
            ..timed_event(id, "", "", offsets)
        }
    }

    /// One full cycle for a single event, as the watcher runs it.
    fn cycle(
        registry: &mut ReminderRegistry,
        event: &UpcomingEvent,
        remaining_minutes: f64,
        notifier: &RecordingNotifier,
    ) -> usize {
        registry.check_integrity(event);
        registry.sync_reminders(event, &event.reminders.offsets(10));
        registry.evaluate(event, remaining_minutes, FireWindow::default(), notifier)
    }

    fn utc_zone() -> DayZone {
        DayZone::Named(Tz::UTC)
    }

    #[test]
    fn first_observation_creates_record_with_all_offsets() {
        let mut registry = ReminderRegistry::new();
        let event = timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10, 30]);

        assert_eq!(registry.sync_reminders(&event, &[10, 30]), 2);

        let record = registry.get("e1").unwrap();
        assert_eq!(record.summary, "e1 summary");
        assert_eq!(record.window, event.window);
        assert_eq!(
            record.reminders(),
            &[ReminderState::pending(10), ReminderState::pending(30)]
        );
    }

    #[test]
    fn sync_is_idempotent() {
        let mut registry = ReminderRegistry::new();
        let event = timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10, 10, 30]);

        registry.sync_reminders(&event, &[10, 10, 30]);
        let once = registry.get("e1").unwrap().clone();
        assert_eq!(registry.sync_reminders(&event, &[10, 10, 30]), 0);

        assert_eq!(registry.get("e1").unwrap(), &once);
        assert_eq!(once.reminders().len(), 2);
    }

    #[test]
    fn sync_does_not_reset_fired_reminders() {
        let mut registry = ReminderRegistry::new();
        let notifier = RecordingNotifier::default();
        let event = timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10]);

        cycle(&mut registry, &event, 9.6, &notifier);
        registry.sync_reminders(&event, &[10]);

        assert!(registry.get("e1").unwrap().reminder(10).unwrap().fired);
    }

    #[test]
    fn check_integrity_ignores_untracked_events() {
        let mut registry = ReminderRegistry::new();
        let event = timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10]);

        assert!(!registry.check_integrity(&event));
        assert!(registry.is_empty());
    }

    #[test]
    fn check_integrity_keeps_unchanged_records() {
        let mut registry = ReminderRegistry::new();
        let event = timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10]);
        registry.sync_reminders(&event, &[10]);

        assert!(!registry.check_integrity(&event));
        assert_eq!(registry.get("e1").unwrap().reminders().len(), 1);
    }

    #[test]
    fn reformatted_time_counts_as_edit() {
        let mut registry = ReminderRegistry::new();
        let event = timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10]);
        registry.sync_reminders(&event, &[10]);

        // Same instant, different representation
        let reformatted =
            timed_event("e1", "2025-03-20T11:00:00-04:00", "2025-03-20T16:00:00Z", &[10]);
        assert!(registry.check_integrity(&reformatted));
        assert!(registry.get("e1").unwrap().reminders().is_empty());
    }

    #[test]
    fn switching_between_all_day_and_timed_is_an_edit() {
        let mut registry = ReminderRegistry::new();
        let event = all_day_event("e1", "2025-03-20", "2025-03-21", &[10]);
        registry.sync_reminders(&event, &[10]);

        let timed = timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10]);
        assert!(registry.check_integrity(&timed));
        let record = registry.get("e1").unwrap();
        assert_eq!(record.window.start_date(), "");
        assert_eq!(record.window.start_date_time(), "2025-03-20T15:00:00Z");
    }

    #[test]
    fn fires_at_most_once_per_edition() {
        let mut registry = ReminderRegistry::new();
        let notifier = RecordingNotifier::default();
        let event = timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10]);

        for remaining in [12.0, 10.5, 9.9, 9.5, 9.1, 9.0, 8.5, 3.0, -1.0] {
            cycle(&mut registry, &event, remaining, &notifier);
        }

        assert_eq!(notifier.count(), 1);
    }

    #[test]
    fn edit_resets_fired_state_and_refires() {
        let mut registry = ReminderRegistry::new();
        let notifier = RecordingNotifier::default();
        let event = timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10]);

        assert_eq!(cycle(&mut registry, &event, 9.6, &notifier), 1);

        let moved = timed_event("e1", "2025-03-20T15:30:00Z", "2025-03-20T16:30:00Z", &[10]);
        assert_eq!(cycle(&mut registry, &moved, 39.0, &notifier), 0);
        assert!(!registry.get("e1").unwrap().reminder(10).unwrap().fired);

        assert_eq!(cycle(&mut registry, &moved, 9.5, &notifier), 1);
        assert_eq!(notifier.count(), 2);
    }

    #[test]
    fn edit_recomputes_reminders_from_current_configuration() {
        let mut registry = ReminderRegistry::new();
        let notifier = RecordingNotifier::default();
        let event = timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10, 30]);
        cycle(&mut registry, &event, 60.0, &notifier);

        let moved = timed_event("e1", "2025-03-21T15:00:00Z", "2025-03-21T16:00:00Z", &[5]);
        cycle(&mut registry, &moved, 60.0, &notifier);

        let leads: Vec<i64> = registry
            .get("e1")
            .unwrap()
            .reminders()
            .iter()
            .map(|r| r.lead_minutes)
            .collect();
        assert_eq!(leads, vec![5]);
    }

    #[test]
    fn whole_day_event_fires_once_inside_window() {
        let mut registry = ReminderRegistry::new();
        let notifier = RecordingNotifier::default();
        let event = all_day_event("E1", "2023-12-31", "2024-01-01", &[10]);

        assert_eq!(cycle(&mut registry, &event, 9.6, &notifier), 1);
        assert!(registry.get("E1").unwrap().reminder(10).unwrap().fired);

        for remaining in [9.4, 9.1, 9.0] {
            assert_eq!(cycle(&mut registry, &event, remaining, &notifier), 0);
        }

        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].summary, "E1 summary");
        assert_eq!(sent[0].description, "E1 description");
        assert_eq!(sent[0].lead_minutes, 9);
    }

    #[test]
    fn removed_override_stays_tracked() {
        let mut registry = ReminderRegistry::new();
        let notifier = RecordingNotifier::default();
        let event = timed_event("E2", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10, 30]);
        cycle(&mut registry, &event, 45.0, &notifier);

        let without_30 = timed_event("E2", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10]);
        cycle(&mut registry, &without_30, 44.5, &notifier);
        assert!(registry.get("E2").unwrap().reminder(30).is_some());

        // The dropped offset still fires when its crossing comes round
        assert_eq!(cycle(&mut registry, &without_30, 29.5, &notifier), 1);
        assert_eq!(notifier.sent.borrow()[0].lead_minutes, 29);
    }

    #[test]
    fn crossing_outside_window_does_not_fire() {
        let mut registry = ReminderRegistry::new();
        let notifier = RecordingNotifier::default();
        let event = timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10]);

        assert_eq!(cycle(&mut registry, &event, 10.2, &notifier), 0);
        // Poll skipped past the window
        assert_eq!(cycle(&mut registry, &event, 8.5, &notifier), 0);

        assert!(!registry.get("e1").unwrap().reminder(10).unwrap().fired);
    }

    #[test]
    fn multiple_offsets_due_together_fire_separately() {
        let mut registry = ReminderRegistry::new();
        let notifier = RecordingNotifier::default();
        let event = timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[0, 1]);

        assert_eq!(cycle(&mut registry, &event, 0.0, &notifier), 2);
    }

    #[test]
    fn evaluate_ignores_untracked_events() {
        let mut registry = ReminderRegistry::new();
        let notifier = RecordingNotifier::default();
        let event = timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10]);

        assert_eq!(
            registry.evaluate(&event, 9.5, FireWindow::default(), &notifier),
            0
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn no_crossing_is_missed_when_polls_run_late() {
        use std::time::Duration as StdDuration;

        for interval_secs in [30, 60, 90, 120, 240] {
            let window = FireWindow::for_poll_interval(StdDuration::from_secs(interval_secs));

            // Sleep plus fetch time between samples
            for fetch_secs in [0.0, 0.5, 20.0] {
                let step = (interval_secs as f64 + fetch_secs) / 60.0;

                for phase in 0..240 {
                    let mut registry = ReminderRegistry::new();
                    let notifier = RecordingNotifier::default();
                    let event =
                        timed_event("e1", "2025-03-20T15:00:00Z", "2025-03-20T16:00:00Z", &[10]);

                    let mut remaining = 20.0 + step * phase as f64 / 240.0;
                    while remaining > -10.0 {
                        registry.check_integrity(&event);
                        registry.sync_reminders(&event, &[10]);
                        registry.evaluate(&event, remaining, window, &notifier);
                        remaining -= step;
                    }

                    assert_eq!(
                        notifier.count(),
                        1,
                        "interval {}s, fetch {}s, phase {}",
                        interval_secs,
                        fetch_secs,
                        phase
                    );
                }
            }
        }
    }

    #[test]
    fn reclaim_respects_grace_horizon() {
        let mut registry = ReminderRegistry::new();
        let now = Utc.with_ymd_and_hms(2025, 3, 20, 18, 0, 0).unwrap();

        let stale = timed_event("stale", "2025-03-20T15:00:00Z", "2025-03-20T15:59:00Z", &[10]);
        let recent = timed_event("recent", "2025-03-20T15:00:00Z", "2025-03-20T16:01:00Z", &[10]);
        let upcoming = timed_event("upcoming", "2025-03-20T19:00:00Z", "2025-03-20T20:00:00Z", &[10]);
        for event in [&stale, &recent, &upcoming] {
            registry.sync_reminders(event, &[10]);
        }

        let removed = registry.reclaim(now, Duration::hours(2), &utc_zone());

        assert_eq!(removed, 1);
        assert!(registry.get("stale").is_none());
        assert!(registry.get("recent").is_some());
        assert!(registry.get("upcoming").is_some());
    }

    #[test]
    fn reclaim_drops_past_events_with_unfired_reminders() {
        let mut registry = ReminderRegistry::new();
        let event = timed_event("e1", "2025-03-20T09:00:00Z", "2025-03-20T10:00:00Z", &[10]);
        registry.sync_reminders(&event, &[10]);
        assert!(registry.get("e1").unwrap().has_pending());

        let now = Utc.with_ymd_and_hms(2025, 3, 20, 18, 0, 0).unwrap();
        assert_eq!(registry.reclaim(now, Duration::hours(2), &utc_zone()), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn reclaim_measures_whole_day_events_from_end_of_end_date() {
        let mut registry = ReminderRegistry::new();
        let event = all_day_event("e1", "2024-01-01", "2024-01-02", &[10]);
        registry.sync_reminders(&event, &[10]);

        // Still on the end date itself
        let same_day = Utc.with_ymd_and_hms(2024, 1, 2, 2, 1, 0).unwrap();
        assert_eq!(registry.reclaim(same_day, Duration::hours(2), &utc_zone()), 0);

        let inside_grace = Utc.with_ymd_and_hms(2024, 1, 3, 1, 59, 0).unwrap();
        assert_eq!(registry.reclaim(inside_grace, Duration::hours(2), &utc_zone()), 0);

        let past_grace = Utc.with_ymd_and_hms(2024, 1, 3, 2, 1, 0).unwrap();
        assert_eq!(registry.reclaim(past_grace, Duration::hours(2), &utc_zone()), 1);
    }

    #[test]
    fn reclaim_keeps_records_with_unparseable_end() {
        let mut registry = ReminderRegistry::new();
        let event = timed_event("e1", "2025-03-20T09:00:00Z", "sometime", &[10]);
        registry.sync_reminders(&event, &[10]);

        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(registry.reclaim(now, Duration::hours(2), &utc_zone()), 0);
        assert!(registry.get("e1").is_some());
    }
}
