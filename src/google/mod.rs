//! Google Calendar event source.

mod api;
mod app_config;
mod session;

pub use api::GoogleCalendar;
