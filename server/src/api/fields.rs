//! Field query endpoints: listings, quota summaries and availability.
//!
//! - GET /api/fields - List all fields
//! - GET /api/fields/:id - Get one field
//! - GET /api/fields/:id/quota - Quota summary for a field
//! - GET /api/fields/:id/availability?date=YYYY-MM-DD&hunters=N

use crate::server::error::AppError;
use crate::server::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use fieldsport_core::types::{Field, FieldId};
use fieldsport_core::Quota;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Response Types
// ============================================================================

/// Quota summary for a field.
#[derive(Debug, Serialize)]
pub struct QuotaResponse {
    /// Field ID
    pub field_id: Uuid,
    /// Whether this field tracks harvests at all
    pub tracked: bool,
    /// Total seasonal allowance across species
    pub total: Option<u32>,
    /// Remaining allowance across species
    pub remaining: Option<u32>,
    /// Whether every entry has reached zero
    pub exhausted: bool,
    /// The full ledger (scalar or per-species)
    pub quota: Quota,
}

/// Response for an availability query.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Whether the field can accept the requested party
    pub available: bool,
    /// Human-readable reason ("Available", or why not)
    pub reason: String,
}

/// Query parameters for the availability check.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Calendar day being requested
    pub date: NaiveDate,
    /// Size of the party
    pub hunters: u32,
}

// ============================================================================
// Handlers
// ============================================================================

/// List all fields.
pub async fn list_fields(State(state): State<AppState>) -> Result<Json<Vec<Field>>, AppError> {
    Ok(Json(state.store.list_fields().await?))
}

/// Get a single field.
pub async fn get_field(
    Path(field_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Field>, AppError> {
    let field = state.store.get_field(FieldId::from_uuid(field_id)).await?;
    Ok(Json(field))
}

/// Get the quota summary for a field.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/fields/<id>/quota
/// # {"field_id":"...","tracked":true,"total":350,"remaining":290,
/// #  "exhausted":false,"quota":{"kind":"species","entries":[...]}}
/// ```
pub async fn get_field_quota(
    Path(field_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<QuotaResponse>, AppError> {
    let field = state.store.get_field(FieldId::from_uuid(field_id)).await?;
    Ok(Json(QuotaResponse {
        field_id,
        tracked: field.quota.is_tracked(),
        total: field.quota.total(),
        remaining: field.quota.remaining(),
        exhausted: field.quota.is_exhausted(),
        quota: field.quota,
    }))
}

/// Check whether a field can accept N more hunters on a date.
///
/// Business refusals (blocked date, capacity) come back as a 200 with
/// `available: false` and the specific reason; an unknown field is a
/// 404; storage failure is a 500.
///
/// # Example
///
/// ```bash
/// curl "http://localhost:8080/api/fields/<id>/availability?date=2025-10-20&hunters=2"
/// # {"available":false,"reason":"insufficient capacity: only 1 spots available"}
/// ```
pub async fn get_availability(
    Path(field_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
    State(state): State<AppState>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let outcome = state
        .store
        .check_availability(FieldId::from_uuid(field_id), query.date, query.hunters)
        .await;
    match outcome {
        Ok(()) => Ok(Json(AvailabilityResponse {
            available: true,
            reason: "Available".to_string(),
        })),
        Err(err) if err.is_business_outcome() => {
            if matches!(err, fieldsport_core::PlatformError::NotFound { .. }) {
                return Err(err.into());
            }
            Ok(Json(AvailabilityResponse {
                available: false,
                reason: err.to_string(),
            }))
        }
        Err(err) => Err(err.into()),
    }
}
