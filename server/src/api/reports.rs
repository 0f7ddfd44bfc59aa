//! Hunt report endpoints.
//!
//! - POST /api/sessions/:id/report - File the report (depletes quota)
//! - PUT /api/reports/:id/review - Edit the review fields
//! - GET /api/reports/:id - Get a report
//! - GET /api/fields/:id/reports - Reports by field

use crate::server::error::AppError;
use crate::server::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use fieldsport_core::types::{AnimalDetail, FieldId, HarvestEntry, HuntReport, ReportId, SessionId};
use fieldsport_core::{NewHuntReport, ReviewUpdate};
use serde::Deserialize;
use uuid::Uuid;

// ============================================================================
// Request Types
// ============================================================================

/// Request to file a hunt report against an active session.
#[derive(Debug, Deserialize)]
pub struct FileReportRequest {
    /// Total animals harvested (0 is a valid empty-handed hunt)
    pub animals_harvested: u32,
    /// Per-species quantities, drives quota depletion
    #[serde(default)]
    pub species_harvested: Vec<HarvestEntry>,
    /// Per-animal structured detail
    #[serde(default)]
    pub animals: Vec<AnimalDetail>,
    /// Free-text remarks about the ground itself
    pub ground_remarks: Option<String>,
    /// Weather during the hunt
    pub weather_conditions: Option<String>,
    /// Hours spent in the field
    pub time_spent_hours: Option<f32>,
    /// General notes
    pub notes: Option<String>,
    /// Review rating, 1-5
    pub review_rating: Option<u8>,
    /// Review text
    pub review_text: Option<String>,
}

/// Request to edit the review fields of a report.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    /// New rating, 1-5
    pub rating: Option<u8>,
    /// New review text
    pub text: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// File the hunt report for an active session.
///
/// The report insert and the field's quota depletion are one atomic
/// step. Ending the session becomes possible once this has succeeded.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/sessions/<id>/report \
///   -H "Content-Type: application/json" \
///   -d '{
///     "animals_harvested": 3,
///     "species_harvested": [{"species": "Red Deer", "quantity": 3}],
///     "ground_remarks": "Lower moor path flooded"
///   }'
/// ```
pub async fn file_report(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<FileReportRequest>,
) -> Result<Json<HuntReport>, AppError> {
    let session_id = SessionId::from_uuid(session_id);
    let session = state.store.get_session(session_id).await?;
    let report = state
        .store
        .create_hunt_report(NewHuntReport {
            session_id,
            field_id: session.field_id,
            hunter_id: session.hunter_id,
            animals_harvested: request.animals_harvested,
            species_harvested: request.species_harvested,
            animals: request.animals,
            ground_remarks: request.ground_remarks,
            weather_conditions: request.weather_conditions,
            time_spent_hours: request.time_spent_hours,
            notes: request.notes,
            review_rating: request.review_rating,
            review_text: request.review_text,
        })
        .await?;
    Ok(Json(report))
}

/// Edit the review fields of an existing report. Harvest data is
/// immutable once filed.
pub async fn update_review(
    Path(report_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<HuntReport>, AppError> {
    let report = state
        .store
        .update_hunt_report(
            ReportId::from_uuid(report_id),
            ReviewUpdate {
                rating: request.rating,
                text: request.text,
            },
        )
        .await?;
    Ok(Json(report))
}

/// Get a report.
pub async fn get_report(
    Path(report_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<HuntReport>, AppError> {
    let report = state.store.get_report(ReportId::from_uuid(report_id)).await?;
    Ok(Json(report))
}

/// Reports filed on a field, newest first.
pub async fn reports_by_field(
    Path(field_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<HuntReport>>, AppError> {
    let reports = state
        .store
        .reports_by_field(FieldId::from_uuid(field_id))
        .await?;
    Ok(Json(reports))
}
