//! Error taxonomy for booking, session, report and tagging operations.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Failure modes of the booking/availability/quota/session core.
///
/// Validation failures (`DoubleBooking`, `CapacityExceeded`, `DateBlocked`,
/// `NotFound`) are expected business outcomes — callers branch on them to
/// show user-facing messages. `InvalidSequence` indicates a caller bug in
/// the session/report ordering. `Persistence` is a storage failure whose
/// partial effects have been rolled back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    // ═══════════════════════════════════════════════════════════
    // Lookup failures
    // ═══════════════════════════════════════════════════════════
    /// The referenced field/booking/session/report/tag does not exist.
    #[error("{resource} {id} not found")]
    NotFound {
        /// Kind of record that was looked up
        resource: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Booking validation failures
    // ═══════════════════════════════════════════════════════════
    /// The hunter already holds an active booking on this date,
    /// anywhere on the platform.
    #[error("you already have a booking on {date} at {field_name}")]
    DoubleBooking {
        /// The contested date
        date: NaiveDate,
        /// Name of the field holding the existing booking
        field_name: String,
    },

    /// The field cannot host this many more hunters on this date.
    #[error("insufficient capacity: only {remaining} spots available")]
    CapacityExceeded {
        /// Headroom still available on that field and date
        remaining: u32,
    },

    /// The owner has blocked this date out.
    #[error("{date} is blocked by the field owner")]
    DateBlocked {
        /// The blocked date
        date: NaiveDate,
    },

    // ═══════════════════════════════════════════════════════════
    // Sequencing and input failures
    // ═══════════════════════════════════════════════════════════
    /// An operation arrived out of order (e.g. ending a session that was
    /// never started, reporting before activation). A caller bug.
    #[error("invalid sequence: {0}")]
    InvalidSequence(String),

    /// A request field failed validation (e.g. zero hunters).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // ═══════════════════════════════════════════════════════════
    // Storage failures
    // ═══════════════════════════════════════════════════════════
    /// The storage layer failed; the operation was rolled back.
    #[error("storage failure: {0}")]
    Persistence(String),
}

impl PlatformError {
    /// Shorthand for a [`PlatformError::NotFound`].
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Whether this error is an expected business outcome (as opposed to
    /// a caller bug or an infrastructure failure).
    #[must_use]
    pub const fn is_business_outcome(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::DoubleBooking { .. }
                | Self::CapacityExceeded { .. }
                | Self::DateBlocked { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_user_facing_reason() {
        let err = PlatformError::CapacityExceeded { remaining: 2 };
        assert_eq!(
            err.to_string(),
            "insufficient capacity: only 2 spots available"
        );
    }

    #[test]
    fn business_outcomes_are_classified() {
        assert!(PlatformError::not_found("field", "x").is_business_outcome());
        assert!(!PlatformError::InvalidSequence("start twice".to_string()).is_business_outcome());
        assert!(!PlatformError::Persistence("io".to_string()).is_business_outcome());
    }
}
