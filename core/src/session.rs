//! Hunt session state machine: `not_started → active → completed`.
//!
//! Linear, no skipping, no rollback. Sessions materialize lazily, only
//! for a confirmed booking dated today — that is a real business rule,
//! not an incidental side effect of a page visit.

use crate::error::{PlatformError, Result};
use crate::types::{Booking, BookingStatus, SessionStatus};
use chrono::NaiveDate;

impl SessionStatus {
    /// Whether `start` is legal from this status.
    #[must_use]
    pub const fn can_start(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Whether `end` is legal from this status. Ending also requires a
    /// filed report, which the storage layer checks in the same
    /// transaction.
    #[must_use]
    pub const fn can_end(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether a hunt report may be filed against this status.
    #[must_use]
    pub const fn can_report(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Gate for lazy session creation: the booking must be confirmed and
/// dated today.
///
/// # Errors
///
/// [`PlatformError::InvalidSequence`] when the booking is not confirmed
/// or its date is not `today`.
pub fn ensure_session_can_materialize(booking: &Booking, today: NaiveDate) -> Result<()> {
    if booking.status != BookingStatus::Confirmed {
        return Err(PlatformError::InvalidSequence(format!(
            "a hunt session requires a confirmed booking, this one is {}",
            booking.status
        )));
    }
    if booking.date != today {
        return Err(PlatformError::InvalidSequence(format!(
            "hunt sessions only exist on the hunt day: booking is for {}, today is {today}",
            booking.date
        )));
    }
    Ok(())
}
