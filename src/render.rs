//! Terminal rendering for gcal-remind types.
//!
//! Extension traits that add colored output to core types using owo_colors.

use chrono::{DateTime, Local, Utc};
use gcal_remind_core::{DayZone, EventRecord, NotificationRequest, UpcomingEvent};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for NotificationRequest {
    fn render(&self) -> String {
        format!(
            "{} [{}] ({})",
            "Reminder:".green().bold(),
            self.summary,
            self.lead_label()
        )
    }
}

/// Rendering that depends on the current instant.
pub trait RenderAt {
    fn render_at(&self, now: DateTime<Utc>, zone: &DayZone) -> String;
}

/// Verbose dump of a tracked record.
impl RenderAt for EventRecord {
    fn render_at(&self, now: DateTime<Utc>, zone: &DayZone) -> String {
        let remaining = self
            .window
            .start_instant(zone)
            .ok()
            .map(|start| (start - now).num_milliseconds() as f64 / 60_000.0);

        let mut header = format!("[{}]", self.summary).green().bold().to_string();
        if !self.reminders().is_empty() && !self.has_pending() {
            header.push_str(&format!(" {}", "(all fired)".dimmed()));
        }

        let mut lines = vec![
            header,
            format!("   {} {}", "id:".dimmed(), self.id),
            format!(
                "   {} {} - {}",
                "date range:".dimmed(),
                self.window.start_date(),
                self.window.end_date()
            ),
            format!(
                "   {} {} - {}",
                "date-time range:".dimmed(),
                self.window.start_date_time(),
                self.window.end_date_time()
            ),
            format!("   {}", "reminders:".dimmed()),
        ];

        for (i, reminder) in self.reminders().iter().enumerate() {
            let fired = if reminder.fired {
                "fired".yellow().to_string()
            } else {
                "pending".cyan().to_string()
            };
            let mut line = format!(
                "      [{}] {}min before, {}",
                i, reminder.lead_minutes, fired
            );
            if let (false, Some(remaining)) = (reminder.fired, remaining) {
                line.push_str(&format!(
                    " {}",
                    format!("(due in {:.1}min)", reminder.minutes_until(remaining)).dimmed()
                ));
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}

/// Listing of an upcoming event with each configured reminder.
pub fn render_listing(
    event: &UpcomingEvent,
    now: DateTime<Utc>,
    zone: &DayZone,
    default_reminder_minutes: i64,
) -> String {
    let start = event.window.start_instant(zone);
    let when = match &start {
        Ok(start) if event.window.is_all_day() => {
            start.with_timezone(&Local).format("%a %b %-d").to_string()
        }
        Ok(start) => start.with_timezone(&Local).format("%a %b %-d %H:%M").to_string(),
        Err(_) => "(unknown start)".to_string(),
    };

    let mut lines = vec![format!("{} {}", event.summary.bold(), format!("({})", when).dimmed())];

    let remaining = start
        .ok()
        .map(|start| (start - now).num_milliseconds() as f64 / 60_000.0);
    if let Some(remaining) = remaining {
        lines.push(format!("   {} {:.2}min", "starts in:".dimmed(), remaining));
    }
    lines.push(format!("   {} {}", "id:".dimmed(), event.id));

    for (i, lead) in event
        .reminders
        .offsets(default_reminder_minutes)
        .iter()
        .enumerate()
    {
        let mut line = format!("   {} [{}] {}min", "reminder".dimmed(), i, lead);
        if let Some(remaining) = remaining {
            line.push_str(&format!(", due in {:.2}min", remaining - *lead as f64));
        }
        lines.push(line);
    }

    lines.join("\n")
}
