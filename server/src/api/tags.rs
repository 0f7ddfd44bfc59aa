//! Animal tag endpoints, including the public verification surface.
//!
//! - POST /api/reports/:id/tags - Issue a tag for one harvested animal
//! - GET /api/reports/:id/tags - Tags issued against a report
//! - GET /api/hunters/:id/tags - Tags issued by a hunter
//! - GET /verify/:tag_number - Public, unauthenticated verification

use crate::server::error::AppError;
use crate::server::state::AppState;
use crate::tagging::{IssueTag, VerifiedTag};
use axum::{
    extract::{Path, State},
    Json,
};
use base64::Engine;
use fieldsport_core::types::{AnimalTag, ReportId, TagNumber, UserId};
use fieldsport_core::PlatformError;
use serde::Deserialize;
use uuid::Uuid;

/// Request to issue a tag against a hunt report.
#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    /// Species of the tagged animal
    pub species: String,
    /// Observed condition (e.g. "Excellent", "Good", "Fair")
    pub condition: String,
    /// Base64-encoded photo of the animal
    pub photo_base64: Option<String>,
    /// Physical tag number attached in the field, if different
    pub physical_tag: Option<String>,
    /// Disease information, if applicable
    pub disease: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
}

/// Issue a tag for one harvested animal.
///
/// Tagging is a voluntary follow-up to the hunt report: a report with N
/// harvested animals may carry anywhere from zero to N tags. The parent
/// report must have harvested at least one animal.
pub async fn create_tag(
    Path(report_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<CreateTagRequest>,
) -> Result<Json<AnimalTag>, AppError> {
    let photo = request
        .photo_base64
        .map(|encoded| {
            base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|_| AppError::validation("photo must be valid base64"))
        })
        .transpose()?;

    let tag = state
        .tagging
        .issue_tag(IssueTag {
            report_id: ReportId::from_uuid(report_id),
            species: request.species,
            condition: request.condition,
            photo,
            physical_tag: request.physical_tag,
            disease: request.disease,
            notes: request.notes,
        })
        .await?;
    Ok(Json(tag))
}

/// Tags issued against a report.
pub async fn tags_by_report(
    Path(report_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<AnimalTag>>, AppError> {
    let tags = state
        .store
        .tags_by_report(ReportId::from_uuid(report_id))
        .await?;
    Ok(Json(tags))
}

/// Tags issued by a hunter, newest first.
pub async fn tags_by_hunter(
    Path(hunter_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<AnimalTag>>, AppError> {
    let tags = state
        .store
        .tags_by_hunter(UserId::from_uuid(hunter_id))
        .await?;
    Ok(Json(tags))
}

/// Public tag verification: anyone scanning a tag's code lands here.
///
/// An unknown tag number is a definitive 404; a storage failure is a
/// 503, so scanners can tell "fake tag" apart from "try again later".
pub async fn verify_tag(
    Path(tag_number): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<VerifiedTag>, AppError> {
    let number = TagNumber::from_string(tag_number);
    let verified = state.tagging.verify(&number).await.map_err(|err| {
        if matches!(err, PlatformError::Persistence(_)) {
            AppError::unavailable("verification is temporarily unavailable")
        } else {
            err.into()
        }
    })?;
    verified
        .map(Json)
        .ok_or_else(|| AppError::not_found("tag", number))
}
