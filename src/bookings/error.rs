use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::bookings::rules::RuleViolation;

/// Error types for booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// One or more booking rules were violated; carries the full list so the
    /// caller can present field-specific errors
    #[error("Booking validation failed")]
    Validation(Vec<RuleViolation>),

    /// A selected slot was taken by a concurrent booking between the check
    /// and the commit
    #[error("Slot conflict: {0}")]
    Conflict(String),

    #[error("Booking not found")]
    NotFound,

    /// A referenced slot definition does not exist; a venue setup problem
    #[error("Slot definition not found: {0}")]
    SlotNotFound(i32),

    /// Pricing or catalog configuration problem, surfaced to staff
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        BookingError::DatabaseError(err.to_string())
    }
}

impl From<crate::pricing::PricingError> for BookingError {
    fn from(err: crate::pricing::PricingError) -> Self {
        match err {
            crate::pricing::PricingError::DatabaseError(e) => {
                BookingError::DatabaseError(e.to_string())
            }
            other => BookingError::Configuration(other.to_string()),
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            BookingError::Validation(violations) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Booking validation failed",
                    "violations": violations,
                }),
            ),
            BookingError::Conflict(msg) => (
                StatusCode::CONFLICT,
                json!({ "error": msg }),
            ),
            BookingError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Booking not found" }),
            ),
            BookingError::SlotNotFound(id) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("Slot definition {} not found", id) }),
            ),
            BookingError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": msg }),
            ),
            BookingError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "A database error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
