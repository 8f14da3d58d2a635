//! Upcoming events from the Google Calendar v3 REST API.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use gcal_remind_core::{EventWindow, ReminderConfig, UpcomingEvent};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use super::session::Session;
use crate::source::EventSource;

const API_BASE: &str = "https://www.googleapis.com/calendar/v3/";

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    summary: String,
    description: Option<String>,
    start: Option<GoogleEventTime>,
    end: Option<GoogleEventTime>,
    reminders: Option<GoogleReminders>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventTime {
    date: Option<String>,
    date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleReminders {
    #[serde(default)]
    use_default: bool,
    #[serde(default)]
    overrides: Vec<GoogleReminderOverride>,
}

#[derive(Debug, Deserialize)]
struct GoogleReminderOverride {
    minutes: i64,
}

pub(crate) trait FromGoogle {
    fn from_google(event: GoogleEvent) -> Result<Self>
    where
        Self: Sized;
}

impl FromGoogle for UpcomingEvent {
    fn from_google(event: GoogleEvent) -> Result<Self> {
        let window = match (event.start, event.end) {
            (
                Some(GoogleEventTime {
                    date_time: Some(start),
                    ..
                }),
                Some(GoogleEventTime {
                    date_time: Some(end),
                    ..
                }),
            ) => EventWindow::timed(start, end),
            (
                Some(GoogleEventTime {
                    date: Some(start), ..
                }),
                Some(GoogleEventTime { date: Some(end), .. }),
            ) => EventWindow::all_day(start, end),
            _ => bail!("Event {} has no usable start/end", event.id),
        };

        // No reminders block means the calendar defaults apply
        let reminders = match event.reminders {
            Some(GoogleReminders {
                use_default: false,
                overrides,
            }) => ReminderConfig::overrides(overrides.into_iter().map(|r| r.minutes)),
            _ => ReminderConfig::default_reminders(),
        };

        Ok(UpcomingEvent {
            id: event.id,
            summary: if event.summary.is_empty() {
                "(No title)".to_string()
            } else {
                event.summary
            },
            description: event.description.filter(|d| !d.is_empty()),
            window,
            reminders,
        })
    }
}

/// A Google calendar read through the stored OAuth session.
pub struct GoogleCalendar {
    http: reqwest::Client,
    session: Session,
    calendar_id: String,
}

impl GoogleCalendar {
    pub async fn connect(calendar_id: &str) -> Result<Self> {
        let session = Session::load_valid().await?;

        Ok(GoogleCalendar {
            http: reqwest::Client::new(),
            session,
            calendar_id: calendar_id.to_string(),
        })
    }

    fn events_url(&self) -> Result<Url> {
        let mut url = Url::parse(API_BASE).context("Invalid API base URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API base URL cannot have path segments"))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }
}

impl EventSource for GoogleCalendar {
    async fn upcoming(&mut self, now: DateTime<Utc>, max_results: u32) -> Result<Vec<UpcomingEvent>> {
        self.session.refresh_if_needed(now).await?;

        let query = [
            ("timeMin", now.to_rfc3339()),
            ("maxResults", max_results.to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("showDeleted", "false".to_string()),
        ];

        let response = self
            .http
            .get(self.events_url()?)
            .bearer_auth(self.session.access_token())
            .query(&query)
            .send()
            .await
            .context("Failed to send events request to Google Calendar")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("Google Calendar returned {}: {}", status, error_text);
        }

        let body: EventsResponse = response
            .json()
            .await
            .context("Failed to parse events from Google Calendar")?;
        debug!(count = body.items.len(), calendar = %self.calendar_id, "Fetched upcoming events");

        Ok(convert_events(body.items))
    }
}

/// Convert fetched events, dropping cancelled ones and any without usable times.
fn convert_events(items: Vec<GoogleEvent>) -> Vec<UpcomingEvent> {
    items
        .into_iter()
        .filter(|e| e.status != "cancelled" && !e.id.is_empty())
        .filter_map(|e| match UpcomingEvent::from_google(e) {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(error = %err, "Skipping event");
                None
            }
        })
        .collect()
}
