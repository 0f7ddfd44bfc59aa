//! Hunt session endpoints.
//!
//! - POST /api/bookings/:id/session - Open (lazily materialize) the session
//! - POST /api/sessions/:id/start - Start the day
//! - POST /api/sessions/:id/end - End the day (report must be filed first)
//! - GET /api/hunters/:id/sessions - Sessions by hunter
//! - GET /api/fields/:id/sessions - Sessions by field

use crate::server::error::AppError;
use crate::server::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use fieldsport_core::types::{BookingId, FieldId, HuntSession, SessionId, UserId};
use fieldsport_core::PlatformEvent;
use uuid::Uuid;

/// Open the session for a confirmed booking dated today, materializing
/// it on first access. Returns the existing session on repeat calls.
pub async fn open_session(
    Path(booking_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<HuntSession>, AppError> {
    let session = state
        .store
        .find_or_create_session(BookingId::from_uuid(booking_id))
        .await?;
    Ok(Json(session))
}

/// Start the hunter's day: `not_started → active`. Notifies the field
/// owner and the platform operator.
pub async fn start_session(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<HuntSession>, AppError> {
    let session = state
        .store
        .start_session(SessionId::from_uuid(session_id))
        .await?;

    let booking = state.store.get_booking(session.booking_id).await?;
    let field = state.store.get_field(session.field_id).await?;
    let hunter = state.store.get_user(session.hunter_id).await?;
    let owner = state.store.get_user(field.owner_id).await?;
    state
        .notifier
        .notify(PlatformEvent::HuntStarted {
            session: session.clone(),
            booking,
            field,
            hunter,
            owner,
        })
        .await;

    Ok(Json(session))
}

/// End the hunter's day: `active → completed`. The hunt report must be
/// filed first; the transition is refused otherwise.
pub async fn end_session(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<HuntSession>, AppError> {
    let session = state
        .store
        .end_session(SessionId::from_uuid(session_id))
        .await?;
    Ok(Json(session))
}

/// Sessions of a hunter, newest first.
pub async fn sessions_by_hunter(
    Path(hunter_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<HuntSession>>, AppError> {
    let sessions = state
        .store
        .sessions_by_hunter(UserId::from_uuid(hunter_id))
        .await?;
    Ok(Json(sessions))
}

/// Sessions on a field, newest first.
pub async fn sessions_by_field(
    Path(field_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<HuntSession>>, AppError> {
    let sessions = state
        .store
        .sessions_by_field(FieldId::from_uuid(field_id))
        .await?;
    Ok(Json(sessions))
}
