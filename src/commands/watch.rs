use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gcal_remind_core::{CycleReport, Notifier, RemindConfig, Watcher};
use owo_colors::OwoColorize;
use tracing::info;

use crate::google::GoogleCalendar;
use crate::notifier::DesktopNotifier;
use crate::render::{RenderAt, render_listing};
use crate::source::EventSource;

#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOptions {
    /// Print upcoming events each poll
    pub list: bool,
    /// Keep watching after listing
    pub keep_running: bool,
    /// Dump every tracked record after evaluation
    pub verbose: bool,
}

impl WatchOptions {
    /// Listing alone never fires reminders.
    fn evaluates(&self) -> bool {
        !self.list || self.keep_running
    }
}

pub async fn run(config: RemindConfig, options: WatchOptions) -> Result<()> {
    let mut source = GoogleCalendar::connect(&config.calendar_id).await?;
    let notifier = DesktopNotifier::new(config.icon.clone());
    let mut watcher = Watcher::new(&config)?;

    info!(
        calendar = %config.calendar_id,
        interval_secs = config.poll_interval_secs,
        "Watching for upcoming events"
    );

    loop {
        poll_once(&mut source, &mut watcher, &notifier, &config, options, Utc::now()).await?;

        if !options.evaluates() {
            return Ok(());
        }
        if options.list {
            println!();
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                return Ok(());
            }
            _ = tokio::time::sleep(config.poll_interval()) => {}
        }
    }
}

/// Fetch upcoming events and run one cycle over them.
pub async fn poll_once<S, N>(
    source: &mut S,
    watcher: &mut Watcher,
    notifier: &N,
    config: &RemindConfig,
    options: WatchOptions,
    now: DateTime<Utc>,
) -> Result<CycleReport>
where
    S: EventSource,
    N: Notifier,
{
    let events = source
        .upcoming(now, config.max_events)
        .await
        .context("Unable to retrieve upcoming events")?;

    if options.list {
        println!("{}", "Upcoming events:".bold());
        for event in &events {
            println!(
                "{}",
                render_listing(event, now, watcher.zone(), watcher.default_reminder_minutes())
            );
        }
    }
    if events.is_empty() {
        println!("{}", "No upcoming events found".dimmed());
    }

    if !options.evaluates() {
        return Ok(CycleReport {
            events: events.len(),
            ..CycleReport::default()
        });
    }

    let report = watcher.run_cycle(&events, now, notifier);

    if options.verbose {
        let mut records: Vec<_> = watcher.registry().records().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        for record in records {
            println!("{}", record.render_at(now, watcher.zone()));
        }
    }

    Ok(report)
}
