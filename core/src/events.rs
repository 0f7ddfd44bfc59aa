//! Notification events emitted by the booking and session lifecycles.
//!
//! Each event carries the booking, field and user records the delivery
//! collaborator needs; the delivery mechanism and message formatting are
//! the collaborator's concern.

use crate::types::{Booking, Field, HuntSession, User};
use serde::Serialize;

/// A lifecycle event worth telling somebody about.
#[derive(Clone, Debug, Serialize)]
pub enum PlatformEvent {
    /// A booking request was created (pending or auto-approved).
    BookingCreated {
        /// The new booking
        booking: Booking,
        /// The booked field
        field: Field,
        /// The booking hunter
        hunter: User,
        /// The field owner
        owner: User,
    },
    /// An operator approved a pending booking.
    BookingApproved {
        /// The approved booking
        booking: Booking,
        /// The booked field
        field: Field,
        /// The booking hunter
        hunter: User,
        /// The field owner
        owner: User,
    },
    /// An operator declined a pending booking (triggers a refund).
    BookingRejected {
        /// The rejected booking
        booking: Booking,
        /// The booked field
        field: Field,
        /// The booking hunter
        hunter: User,
        /// The field owner
        owner: User,
    },
    /// The hunter cancelled a confirmed booking.
    BookingCancelled {
        /// The cancelled booking
        booking: Booking,
        /// The booked field
        field: Field,
        /// The booking hunter
        hunter: User,
        /// The field owner
        owner: User,
    },
    /// A hunter started their day in the field.
    HuntStarted {
        /// The active session
        session: HuntSession,
        /// The underlying booking
        booking: Booking,
        /// The field being hunted
        field: Field,
        /// The hunter in the field
        hunter: User,
        /// The field owner
        owner: User,
    },
}

impl PlatformEvent {
    /// Short machine-readable name, used as a log field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BookingCreated { .. } => "booking_created",
            Self::BookingApproved { .. } => "booking_approved",
            Self::BookingRejected { .. } => "booking_rejected",
            Self::BookingCancelled { .. } => "booking_cancelled",
            Self::HuntStarted { .. } => "hunt_started",
        }
    }
}
