//! Desktop notifications via notify-rust.

use std::path::PathBuf;

use gcal_remind_core::{NotificationRequest, Notifier};
use notify_rust::Notification;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::render::Render;

pub struct DesktopNotifier {
    icon: Option<PathBuf>,
}

impl DesktopNotifier {
    pub fn new(icon: Option<PathBuf>) -> Self {
        DesktopNotifier { icon }
    }
}

impl Notifier for DesktopNotifier {
    /// Shows the notification on a detached blocking task; failures are only logged.
    fn notify(&self, request: NotificationRequest) {
        println!("{}", request.render());

        let notification = build_notification(&request, self.icon.as_ref());
        dispatch(move || {
            if let Err(e) = notification.show() {
                warn!(summary = %request.summary, error = %e, "Failed to show desktop notification");
            }
        });
    }
}

/// Run `show` on the blocking pool without awaiting it.
fn dispatch<F>(show: F) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    tokio::task::spawn_blocking(show)
}

/// Application name line, e.g. "Google Calendar (in 10min)"
fn app_name(request: &NotificationRequest) -> String {
    format!("Google Calendar ({})", request.lead_label())
}

fn build_notification(request: &NotificationRequest, icon: Option<&PathBuf>) -> Notification {
    let mut notification = Notification::new();
    notification
        .summary(&request.summary)
        .body(&request.description)
        .appname(&app_name(request));

    if let Some(icon) = icon {
        notification.icon(&icon.to_string_lossy());
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    notification.urgency(notify_rust::Urgency::Normal);

    notification
}
