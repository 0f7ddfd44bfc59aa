//! Error types for HTTP handlers.
//!
//! Bridges domain errors into HTTP responses via Axum's `IntoResponse`.
//! Business outcomes keep their specific reason; storage failures are
//! logged and flattened into a generic 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fieldsport_core::PlatformError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "SERVICE_UNAVAILABLE".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Maps the domain taxonomy onto HTTP statuses. Validation failures are
/// conflicts or unprocessable input; only `Persistence` hides its detail
/// behind a generic message.
impl From<PlatformError> for AppError {
    fn from(err: PlatformError) -> Self {
        let message = err.to_string();
        match &err {
            PlatformError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND".to_string())
            }
            PlatformError::DoubleBooking { .. } => Self::new(
                StatusCode::CONFLICT,
                message,
                "DOUBLE_BOOKING".to_string(),
            ),
            PlatformError::CapacityExceeded { .. } => Self::new(
                StatusCode::CONFLICT,
                message,
                "CAPACITY_EXCEEDED".to_string(),
            ),
            PlatformError::DateBlocked { .. } => {
                Self::new(StatusCode::CONFLICT, message, "DATE_BLOCKED".to_string())
            }
            PlatformError::InvalidSequence(_) => Self::new(
                StatusCode::CONFLICT,
                message,
                "INVALID_SEQUENCE".to_string(),
            ),
            PlatformError::InvalidInput(_) => Self::validation(message),
            PlatformError::Persistence(_) => {
                Self::internal("An internal error occurred").with_source(err.into())
            }
        }
    }
}

impl From<crate::payments::PaymentError> for AppError {
    fn from(err: crate::payments::PaymentError) -> Self {
        use crate::payments::PaymentError;
        let message = err.to_string();
        match &err {
            PaymentError::InvalidCard(_) => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                message,
                "PAYMENT_INVALID".to_string(),
            ),
            PaymentError::Declined(_) => Self::new(
                StatusCode::PAYMENT_REQUIRED,
                message,
                "PAYMENT_DECLINED".to_string(),
            ),
            PaymentError::Unavailable(_) => Self::unavailable(message),
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors with their source before flattening.
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn double_booking_maps_to_conflict() {
        let err: AppError = PlatformError::DoubleBooking {
            date: chrono::NaiveDate::MIN,
            field_name: "Highland Estate".to_string(),
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "DOUBLE_BOOKING");
    }

    #[test]
    fn persistence_hides_its_detail() {
        let err: AppError = PlatformError::Persistence("connection refused".to_string()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "An internal error occurred");
        assert!(err.source.is_some());
    }

    #[test]
    fn invalid_input_maps_to_unprocessable() {
        let err: AppError = PlatformError::InvalidInput("zero hunters".to_string()).into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
