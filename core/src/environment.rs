//! Dependency-injection traits shared by storage backends and services.

use chrono::{DateTime, NaiveDate, Utc};

/// Clock trait - abstracts time operations for testability.
///
/// The session lifecycle depends on "today" (sessions only materialize
/// on the hunt day), so production code takes a clock rather than
/// calling `Utc::now()` directly.
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;

    /// Get the current calendar day
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
