//! Core of gcal-remind: the reminder state machine.
//!
//! - [`registry`] tracks events, their reminder offsets and which have fired
//! - [`watcher`] drives the registry through poll cycles
//! - [`event`] holds the upstream event types handed in by an event source
//! - [`config`] loads the agent's configuration

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod fire_window;
pub mod notifier;
pub mod registry;
pub mod watcher;
pub mod zone;

pub use config::RemindConfig;
pub use error::{RemindError, RemindResult};
pub use event::{EventWindow, ReminderConfig, UpcomingEvent};
pub use fire_window::FireWindow;
pub use notifier::{NotificationRequest, Notifier};
pub use registry::{EventRecord, ReminderRegistry, ReminderState};
pub use watcher::{CycleReport, Watcher};
pub use zone::DayZone;
