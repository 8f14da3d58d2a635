//! Notification requests emitted by fire evaluation.

/// A reminder that is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub summary: String,
    pub description: String,
    /// Whole minutes until the event starts; negative once it has started
    pub lead_minutes: i64,
}

impl NotificationRequest {
    /// Human-readable distance, e.g. "in 10min" or "3min ago".
    pub fn lead_label(&self) -> String {
        if self.lead_minutes < 0 {
            format!("{}min ago", -self.lead_minutes)
        } else {
            format!("in {}min", self.lead_minutes)
        }
    }
}

/// Something that can show a reminder to the user.
///
/// Delivery is fire-and-forget: implementations must not block on the
/// notification being shown, and a failure to show it is theirs to report.
pub trait Notifier {
    fn notify(&self, request: NotificationRequest);
}
