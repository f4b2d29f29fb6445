//! Time source for journey dates and ids.

use chrono::{Local, Utc};

/// Supplies the journey date and the commit timestamp.
pub trait Clock: std::fmt::Debug + Send + Sync {
    /// Today's date, formatted for display and storage.
    fn today(&self) -> String;

    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// The local wall clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemClock {
    date_format: String,
}

impl SystemClock {
    /// Format dates with the strftime pattern `date_format`.
    #[must_use]
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(crate::config::JourneyConfig::default().date_format)
    }
}

impl Clock for SystemClock {
    fn today(&self) -> String {
        Local::now().format(&self.date_format).to_string()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that never moves. Handy for tests and replays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedClock {
    date: String,
    millis: i64,
}

impl FixedClock {
    /// Always report `date` and `millis`.
    #[must_use]
    pub fn new(date: impl Into<String>, millis: i64) -> Self {
        Self {
            date: date.into(),
            millis,
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> String {
        self.date.clone()
    }

    fn now_millis(&self) -> i64 {
        self.millis
    }
}
