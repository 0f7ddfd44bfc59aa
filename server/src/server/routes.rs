//! Router configuration for the Fieldsport server.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{bookings, fields, reports, sessions, tags};
use axum::{
    routing::{get, post, put},
    Router,
};

/// Build the complete Axum router.
///
/// Configures all routes:
/// - Health checks
/// - Field queries and availability
/// - Booking lifecycle
/// - Hunt sessions, reports and reviews
/// - Animal tags and the public verification surface
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Fields and availability
        .route("/fields", get(fields::list_fields))
        .route("/fields/:id", get(fields::get_field))
        .route("/fields/:id/quota", get(fields::get_field_quota))
        .route("/fields/:id/availability", get(fields::get_availability))
        // Booking lifecycle
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/status", put(bookings::update_booking_status))
        .route("/hunters/:id/bookings", get(bookings::bookings_by_hunter))
        .route("/hunters/:id/todays-bookings", get(bookings::todays_bookings))
        .route("/fields/:id/bookings", get(bookings::bookings_by_field))
        // Hunt sessions
        .route("/bookings/:id/session", post(sessions::open_session))
        .route("/sessions/:id/start", post(sessions::start_session))
        .route("/sessions/:id/end", post(sessions::end_session))
        .route("/hunters/:id/sessions", get(sessions::sessions_by_hunter))
        .route("/fields/:id/sessions", get(sessions::sessions_by_field))
        // Hunt reports
        .route("/sessions/:id/report", post(reports::file_report))
        .route("/reports/:id", get(reports::get_report))
        .route("/reports/:id/review", put(reports::update_review))
        .route("/fields/:id/reports", get(reports::reports_by_field))
        // Animal tags
        .route(
            "/reports/:id/tags",
            post(tags::create_tag).get(tags::tags_by_report),
        )
        .route("/hunters/:id/tags", get(tags::tags_by_hunter));

    Router::new()
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Public verification surface (no authentication)
        .route("/verify/:tag_number", get(tags::verify_tag))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .with_state(state)
}
