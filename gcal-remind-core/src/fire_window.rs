//! Tolerance window for reminder crossings.

use std::time::Duration;

/// Narrowest window, in minutes.
const MIN_WIDTH_MINUTES: f64 = 1.0;

/// Least slack added on top of the poll interval, in seconds.
const MIN_SLACK_SECS: f64 = 30.0;

/// How far past its crossing point a reminder may still fire.
///
/// A reminder fires when `remaining - lead` lies in `[-width, 0]`. Two
/// samples are one poll interval plus the fetch time apart, so the width
/// must exceed the interval or a crossing can fall between two polls and the
/// reminder is missed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireWindow {
    width_minutes: f64,
}

impl Default for FireWindow {
    fn default() -> Self {
        FireWindow {
            width_minutes: MIN_WIDTH_MINUTES,
        }
    }
}

impl FireWindow {
    /// Window covering one poll interval plus slack for the time each poll
    /// spends fetching: `interval + max(30s, interval / 2)`.
    pub fn for_poll_interval(interval: Duration) -> Self {
        let interval_secs = interval.as_secs_f64();
        let slack_secs = (interval_secs / 2.0).max(MIN_SLACK_SECS);
        let minutes = (interval_secs + slack_secs) / 60.0;
        FireWindow {
            width_minutes: minutes.max(MIN_WIDTH_MINUTES),
        }
    }

    pub fn width_minutes(&self) -> f64 {
        self.width_minutes
    }

    /// Whether a crossing value (`remaining - lead`, in minutes) is due.
    pub fn contains(&self, crossing: f64) -> bool {
        crossing <= 0.0 && crossing >= -self.width_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_one_minute() {
        let window = FireWindow::default();
        assert!(window.contains(0.0));
        assert!(window.contains(-0.4));
        assert!(window.contains(-1.0));
        assert!(!window.contains(0.01));
        assert!(!window.contains(-1.01));
    }

    #[test]
    fn short_poll_intervals_keep_minimum_width() {
        let window = FireWindow::for_poll_interval(Duration::from_secs(30));
        assert_eq!(window.width_minutes(), 1.0);
    }

    #[test]
    fn minute_interval_gets_thirty_seconds_of_slack() {
        let window = FireWindow::for_poll_interval(Duration::from_secs(60));
        assert_eq!(window.width_minutes(), 1.5);
    }

    #[test]
    fn long_poll_intervals_widen_the_window() {
        let window = FireWindow::for_poll_interval(Duration::from_secs(240));
        assert_eq!(window.width_minutes(), 6.0);
        assert!(window.contains(-5.9));
        assert!(!window.contains(-6.1));
    }
}
