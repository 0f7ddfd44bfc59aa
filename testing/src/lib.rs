//! Testing utilities for the Fieldsport platform: a deterministic
//! in-memory [`PlatformStore`] and a fixed clock.
//!
//! The in-memory store serializes every operation behind one mutex,
//! which gives the same check-then-act atomicity the PostgreSQL store
//! gets from row locks — at single-process scale the two are
//! interchangeable, so the scenario suites run against this store
//! without a database.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use fieldsport_core::Clock;
use std::sync::Mutex;

/// Clock pinned to a programmable instant, for deterministic tests of
/// the "sessions only materialize on the hunt day" rule and friends.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock pinned to `now`.
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to a new instant.
    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
            .lock()
            .map_or(DateTime::<Utc>::UNIX_EPOCH, |guard| *guard)
    }
}
