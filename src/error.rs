// Error handling module for the Venue API
// Provides centralized error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response, Json},
};
use serde::Serialize;
use chrono::Utc;
use tracing::{error, warn, debug};

/// Main error type for the API
/// All handlers should return Result<T, ApiError>
///
/// Each variant maps to a specific HTTP status code and error response format.
#[derive(Debug)]
pub enum ApiError {
    /// Validation errors from request validation
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound {
        resource: String,
        id: String,
    },

    /// Duplicate or still-referenced resource conflict
    /// Maps to HTTP 409 Conflict
    Conflict {
        message: String,
    },

    /// Venue configuration problem (missing slot or pricing schedule entry)
    /// Maps to HTTP 500 Internal Server Error; surfaced to staff, never
    /// silently defaulted
    Configuration {
        message: String,
    },

    /// Database operation errors
    /// Maps to HTTP 500 Internal Server Error
    /// Sensitive details are filtered from client responses
    DatabaseError(sqlx::Error),

    /// Internal server errors
    /// Maps to HTTP 500 Internal Server Error
    InternalError(String),
}

/// Consistent error response structure
///
/// JSON format shared by all error types, with both a machine-readable
/// error_code and a human-readable message.
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR", "NOT_FOUND")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (e.g., field-level validation errors)
    /// Omitted from JSON when None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Includes logging at levels matching error severity:
    /// - error!: for internal, configuration, and database errors (500-level)
    /// - warn!: for conflicts (might indicate contention or setup issues)
    /// - debug!: for expected client errors (validation, not found)
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);

                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error_code: "VALIDATION_ERROR".to_string(),
                        message: "Request validation failed".to_string(),
                        details: Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({}))),
                        timestamp: Utc::now().to_rfc3339(),
                    }
                )
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);

                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse {
                        error_code: "NOT_FOUND".to_string(),
                        message: format!("{} with id {} not found", resource, id),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    }
                )
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);

                (
                    StatusCode::CONFLICT,
                    ErrorResponse {
                        error_code: "CONFLICT".to_string(),
                        message: message.clone(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    }
                )
            }
            ApiError::Configuration { message } => {
                error!("Configuration error: {}", message);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error_code: "CONFIGURATION_ERROR".to_string(),
                        message: message.clone(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    }
                )
            }
            ApiError::DatabaseError(db_error) => {
                // Full database error is logged internally; clients get a
                // generic message with no sensitive detail
                error!("Database error: {:?}", db_error);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error_code: "DATABASE_ERROR".to_string(),
                        message: "A database error occurred".to_string(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    }
                )
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error_code: "INTERNAL_ERROR".to_string(),
                        message: "An internal server error occurred".to_string(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    }
                )
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert sqlx errors to ApiError
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error)
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}
