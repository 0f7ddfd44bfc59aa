//! Booking lifecycle rules: status transitions and creation validation.

use crate::error::{PlatformError, Result};
use crate::types::{BookingStatus, FieldId, Money, PaymentRef, UserId};
use chrono::NaiveDate;

impl BookingStatus {
    /// Whether this booking counts against capacity and the
    /// one-booking-per-day rule.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Whether the lifecycle permits moving from `self` to `to`.
    ///
    /// Legal transitions: pending → confirmed (operator approval),
    /// pending → rejected (operator decline), confirmed → cancelled
    /// (hunter-initiated). Nothing leaves cancelled or rejected.
    #[must_use]
    pub const fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Rejected)
                | (Self::Confirmed, Self::Cancelled)
        )
    }

    /// Initial status for a freshly created booking.
    #[must_use]
    pub const fn initial(auto_approve: bool) -> Self {
        if auto_approve {
            Self::Confirmed
        } else {
            Self::Pending
        }
    }
}

/// Parameters for creating a booking.
#[derive(Clone, Debug, PartialEq)]
pub struct NewBooking {
    /// Field to book
    pub field_id: FieldId,
    /// Booking hunter
    pub hunter_id: UserId,
    /// Calendar day of the hunt
    pub date: NaiveDate,
    /// Hunters covered by the booking (at least 1)
    pub num_hunters: u32,
    /// Total price paid or payable
    pub total_price: Money,
    /// Gateway payment reference, if a payment was taken
    pub payment_ref: Option<PaymentRef>,
    /// Administrative override: skips the double-booking and capacity
    /// invariants. A documented escape hatch, not a bug.
    pub admin_override: bool,
}

impl NewBooking {
    /// Validates request-level constraints before any storage work.
    ///
    /// # Errors
    ///
    /// [`PlatformError::InvalidInput`] when `num_hunters` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.num_hunters == 0 {
            return Err(PlatformError::InvalidInput(
                "a booking must cover at least one hunter".to_string(),
            ));
        }
        Ok(())
    }
}
