// Error types for the pricing module

use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Main error type for pricing resolution and schedule administration
#[derive(Debug, Error)]
pub enum PricingError {
    /// The slot name does not map to any known pricing schedule name
    #[error("Unknown slot name: {0}")]
    UnknownSlotName(String),

    /// No schedule row exists for a known slot name
    /// Indicates a venue setup problem, surfaced to staff
    #[error("No pricing schedule configured for {0}")]
    ScheduleNotFound(String),

    /// A schedule update violated its own invariants
    /// (non-positive price, future price without an effective date,
    /// effective date not strictly after today)
    #[error("Invalid pricing schedule: {0}")]
    InvalidSchedule(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Result type alias for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            PricingError::UnknownSlotName(_) => (StatusCode::BAD_REQUEST, "Unknown slot name"),
            PricingError::ScheduleNotFound(_) => (StatusCode::NOT_FOUND, "Pricing schedule not found"),
            PricingError::InvalidSchedule(_) => (StatusCode::BAD_REQUEST, "Invalid pricing schedule"),
            PricingError::DatabaseError(ref e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "details": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Convert pricing errors into the top-level API error for handlers that
/// mix catalog and pricing reads
impl From<PricingError> for crate::error::ApiError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::DatabaseError(e) => crate::error::ApiError::DatabaseError(e),
            other => crate::error::ApiError::Configuration {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = PricingError::UnknownSlotName("Brunch".to_string());
        assert_eq!(error.to_string(), "Unknown slot name: Brunch");

        let error = PricingError::ScheduleNotFound("Lunch".to_string());
        assert_eq!(error.to_string(), "No pricing schedule configured for Lunch");

        let error = PricingError::InvalidSchedule("current price must be positive".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid pricing schedule: current price must be positive"
        );
    }

    #[test]
    fn test_error_from_sqlx() {
        let sqlx_error = sqlx::Error::RowNotFound;
        let pricing_error: PricingError = sqlx_error.into();
        assert!(matches!(pricing_error, PricingError::DatabaseError(_)));
    }
}
