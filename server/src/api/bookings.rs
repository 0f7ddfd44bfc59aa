//! Booking lifecycle endpoints.
//!
//! - POST /api/bookings - Create a booking (availability + payment + insert)
//! - GET /api/bookings/:id - Get a booking
//! - PUT /api/bookings/:id/status - Approve / reject / cancel
//! - GET /api/hunters/:id/bookings - Bookings by hunter
//! - GET /api/hunters/:id/todays-bookings - Today's confirmed bookings
//! - GET /api/fields/:id/bookings - Bookings by field

use crate::payments::CardDetails;
use crate::server::error::AppError;
use crate::server::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use fieldsport_core::types::{Booking, BookingId, BookingStatus, FieldId, UserId};
use fieldsport_core::{NewBooking, PlatformEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a new booking.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Field to book
    pub field_id: Uuid,
    /// Booking hunter
    pub hunter_id: Uuid,
    /// Calendar day of the hunt
    pub date: NaiveDate,
    /// Hunters covered by the booking
    pub num_hunters: u32,
    /// Card details; required when the field charges per day
    pub card: Option<CardDetails>,
    /// Administrative override: skips the double-booking and capacity
    /// checks, and takes no payment
    #[serde(default)]
    pub admin_override: bool,
}

/// Response after creating a booking.
#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    /// The created booking
    pub booking: Booking,
    /// Message for the user
    pub message: String,
}

/// Request to change a booking's status.
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    /// Target status
    pub status: BookingStatus,
    /// Administrative force: apply the transition even when the
    /// lifecycle forbids it
    #[serde(default)]
    pub force: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a booking.
///
/// Runs the availability pre-check, takes payment through the gateway
/// (unless the field is free or an admin override is in play), persists
/// the booking atomically with its invariant checks, then notifies the
/// hunter and the field owner.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/bookings \
///   -H "Content-Type: application/json" \
///   -d '{
///     "field_id": "...", "hunter_id": "...",
///     "date": "2025-10-20", "num_hunters": 2,
///     "card": {"number": "4242 4242 4242 4242", "cvv": "123",
///              "expiry": "12/27", "holder_name": "John Hunter"}
///   }'
/// ```
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<CreateBookingResponse>, AppError> {
    let field_id = FieldId::from_uuid(request.field_id);
    let hunter_id = UserId::from_uuid(request.hunter_id);
    let field = state.store.get_field(field_id).await?;

    // Pre-check for a friendly error before money moves; the creating
    // transaction re-validates under its locks either way.
    if !request.admin_override {
        state
            .store
            .check_availability(field_id, request.date, request.num_hunters)
            .await?;
    }

    let total_price = field
        .price_per_day
        .checked_multiply(request.num_hunters)
        .ok_or_else(|| AppError::validation("total price overflows"))?;

    let payment_ref = if request.admin_override || total_price.is_zero() {
        None
    } else {
        let card = request
            .card
            .ok_or_else(|| AppError::validation("card details are required for a paid booking"))?;
        Some(state.gateway.charge(total_price, card).await?)
    };

    let booking = state
        .store
        .create_booking(NewBooking {
            field_id,
            hunter_id,
            date: request.date,
            num_hunters: request.num_hunters,
            total_price,
            payment_ref,
            admin_override: request.admin_override,
        })
        .await?;

    let hunter = state.store.get_user(booking.hunter_id).await?;
    let owner = state.store.get_user(field.owner_id).await?;
    state
        .notifier
        .notify(PlatformEvent::BookingCreated {
            booking: booking.clone(),
            field,
            hunter,
            owner,
        })
        .await;

    let message = if request.admin_override {
        "Booking created successfully (admin override)".to_string()
    } else {
        format!("Booking created successfully, status: {}", booking.status)
    };
    Ok(Json(CreateBookingResponse { booking, message }))
}

/// Get a booking.
pub async fn get_booking(
    Path(booking_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .store
        .get_booking(BookingId::from_uuid(booking_id))
        .await?;
    Ok(Json(booking))
}

/// Change a booking's status (operator approval/decline, hunter
/// cancellation, or administrative force).
///
/// A rejection refunds the payment through the gateway; approval,
/// rejection and cancellation each notify the affected parties.
pub async fn update_booking_status(
    Path(booking_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .store
        .update_booking_status(BookingId::from_uuid(booking_id), request.status, request.force)
        .await?;

    if request.status == BookingStatus::Rejected {
        if let Some(payment_ref) = &booking.payment_ref {
            if let Err(err) = state.gateway.refund(payment_ref, booking.total_price).await {
                tracing::warn!(
                    booking_id = %booking.id,
                    error = %err,
                    "refund for rejected booking failed"
                );
            }
        }
    }

    let field = state.store.get_field(booking.field_id).await?;
    let hunter = state.store.get_user(booking.hunter_id).await?;
    let owner = state.store.get_user(field.owner_id).await?;
    let event = match request.status {
        BookingStatus::Confirmed => Some(PlatformEvent::BookingApproved {
            booking: booking.clone(),
            field,
            hunter,
            owner,
        }),
        BookingStatus::Rejected => Some(PlatformEvent::BookingRejected {
            booking: booking.clone(),
            field,
            hunter,
            owner,
        }),
        BookingStatus::Cancelled => Some(PlatformEvent::BookingCancelled {
            booking: booking.clone(),
            field,
            hunter,
            owner,
        }),
        BookingStatus::Pending => None,
    };
    if let Some(event) = event {
        state.notifier.notify(event).await;
    }

    Ok(Json(booking))
}

/// Bookings made by a hunter, newest first.
pub async fn bookings_by_hunter(
    Path(hunter_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state
        .store
        .bookings_by_hunter(UserId::from_uuid(hunter_id))
        .await?;
    Ok(Json(bookings))
}

/// The hunter's confirmed bookings dated today — the entry point to the
/// hunt-day session flow.
pub async fn todays_bookings(
    Path(hunter_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state
        .store
        .todays_confirmed_bookings(UserId::from_uuid(hunter_id))
        .await?;
    Ok(Json(bookings))
}

/// Bookings on a field, newest first.
pub async fn bookings_by_field(
    Path(field_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state
        .store
        .bookings_by_field(FieldId::from_uuid(field_id))
        .await?;
    Ok(Json(bookings))
}
