//! gcal-remind configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CALENDAR_ID, DEFAULT_CLEANUP_EVERY, DEFAULT_GRACE_MINUTES, DEFAULT_MAX_EVENTS,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REMINDER_MINUTES,
};
use crate::error::{RemindError, RemindResult};
use crate::fire_window::FireWindow;
use crate::zone::DayZone;

/// Configuration at ~/.config/gcal-remind/config.toml
///
/// Every key is optional. Command-line flags override what is set here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemindConfig {
    pub poll_interval_secs: u64,

    pub cleanup_every: u32,

    pub default_reminder_minutes: i64,

    pub max_events: u32,

    pub calendar_id: String,

    pub grace_minutes: i64,

    /// IANA zone for whole-day events; the system zone when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Icon shown with desktop notifications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<PathBuf>,
}

impl Default for RemindConfig {
    fn default() -> Self {
        RemindConfig {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            cleanup_every: DEFAULT_CLEANUP_EVERY,
            default_reminder_minutes: DEFAULT_REMINDER_MINUTES,
            max_events: DEFAULT_MAX_EVENTS,
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            grace_minutes: DEFAULT_GRACE_MINUTES,
            timezone: None,
            icon: None,
        }
    }
}

impl RemindConfig {
    pub fn config_dir() -> RemindResult<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| RemindError::Config("Could not determine config directory".into()))?
            .join("gcal-remind"))
    }

    pub fn config_path() -> RemindResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the config from its default location, falling back to defaults
    /// when no file exists.
    pub fn load() -> RemindResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> RemindResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| RemindError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> RemindResult<Self> {
        let config: RemindConfig =
            toml::from_str(content).map_err(|e| RemindError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RemindResult<()> {
        if self.poll_interval_secs == 0 {
            return Err(RemindError::Config(
                "poll_interval_secs must be greater than zero".into(),
            ));
        }
        if self.cleanup_every == 0 {
            return Err(RemindError::Config(
                "cleanup_every must be greater than zero".into(),
            ));
        }
        if self.grace_minutes < 0 {
            return Err(RemindError::Config("grace_minutes cannot be negative".into()));
        }
        self.zone()?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn grace(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.grace_minutes)
    }

    pub fn zone(&self) -> RemindResult<DayZone> {
        DayZone::from_name(self.timezone.as_deref())
    }

    pub fn fire_window(&self) -> FireWindow {
        FireWindow::for_poll_interval(self.poll_interval())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> RemindResult<()> {
        let contents = format!(
            "\
# gcal-remind configuration

# Seconds between polls of the calendar:
# poll_interval_secs = {DEFAULT_POLL_INTERVAL_SECS}

# Polls between two clean-ups of past events:
# cleanup_every = {DEFAULT_CLEANUP_EVERY}

# Lead time for events using the calendar's default reminders:
# default_reminder_minutes = {DEFAULT_REMINDER_MINUTES}

# Upcoming events fetched per poll:
# max_events = {DEFAULT_MAX_EVENTS}

# Calendar to watch:
# calendar_id = \"{DEFAULT_CALENDAR_ID}\"

# Minutes after an event ends before it is forgotten:
# grace_minutes = {DEFAULT_GRACE_MINUTES}

# Zone in which whole-day events begin (defaults to the system zone):
# timezone = \"America/New_York\"

# Icon shown with notifications:
# icon = \"~/.local/share/icons/calendar.png\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RemindError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| RemindError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
