//! Availability evaluation for a field on a given day.
//!
//! Pure rules shared by every storage backend: the backend gathers the
//! committed head count under its own concurrency guard and delegates
//! the decision here, so the check-then-act logic cannot drift between
//! implementations.

use crate::error::{PlatformError, Result};
use crate::types::Field;
use chrono::NaiveDate;

/// Checks whether `field` can accept `requested` more hunters on `date`,
/// given `committed` hunters already booked (pending or confirmed) for
/// that field and date.
///
/// Rules, first failure wins:
/// 1. the date must not be blocked by the owner;
/// 2. `committed + requested` must fit within the field's capacity.
///
/// Field existence is the storage layer's lookup concern and is checked
/// before this function is reached.
///
/// # Errors
///
/// [`PlatformError::DateBlocked`] or [`PlatformError::CapacityExceeded`]
/// (carrying the remaining headroom).
pub fn evaluate(field: &Field, date: NaiveDate, committed: u32, requested: u32) -> Result<()> {
    if field.blocked_dates.contains(&date) {
        return Err(PlatformError::DateBlocked { date });
    }

    let capacity = field.capacity.value();
    if committed.saturating_add(requested) > capacity {
        return Err(PlatformError::CapacityExceeded {
            remaining: capacity.saturating_sub(committed),
        });
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::quota::Quota;
    use crate::types::{Capacity, FieldId, FieldType, Money, UserId};
    use chrono::Utc;

    fn field(capacity: u32) -> Field {
        Field {
            id: FieldId::new(),
            name: "Highland Estate".to_string(),
            owner_id: UserId::new(),
            location: "Scottish Highlands".to_string(),
            field_type: FieldType::Subsidised,
            capacity: Capacity::new(capacity),
            price_per_day: Money::from_pence(45_000),
            blocked_dates: std::collections::BTreeSet::new(),
            quota: Quota::Untracked,
            auto_approve_bookings: false,
            last_visit: None,
            created_at: Utc::now(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()
    }

    #[test]
    fn accepts_request_filling_capacity_exactly() {
        assert!(evaluate(&field(2), date(), 0, 2).is_ok());
    }

    #[test]
    fn rejects_request_over_capacity_with_headroom() {
        let err = evaluate(&field(2), date(), 2, 1).unwrap_err();
        assert_eq!(err, PlatformError::CapacityExceeded { remaining: 0 });
    }

    #[test]
    fn reports_partial_headroom() {
        let err = evaluate(&field(4), date(), 3, 2).unwrap_err();
        assert_eq!(err, PlatformError::CapacityExceeded { remaining: 1 });
    }

    #[test]
    fn blocked_date_wins_over_capacity() {
        let mut f = field(0);
        f.blocked_dates.insert(date());
        let err = evaluate(&f, date(), 0, 1).unwrap_err();
        assert_eq!(err, PlatformError::DateBlocked { date: date() });
    }
}
