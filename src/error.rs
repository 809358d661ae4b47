// Error handling module for the Employee Directory API
// Provides the crate-wide error type and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use utoipa::ToSchema;

/// Main error type for the API
///
/// Module errors (`AuthError`, `EmployeeError`) convert into this type, so every
/// failure leaves the service through the same response shape.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input
    /// Maps to HTTP 400 Bad Request
    ValidationError(String),

    /// Resource not found
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String },

    /// Uniqueness violation
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// Authentication failures
    /// Maps to HTTP 401 Unauthorized
    Unauthorized(String),

    /// Unexpected store, codec or I/O failures
    /// Maps to HTTP 500 Internal Server Error
    /// The detail is logged and never sent to the client
    InternalError(String),
}

/// Consistent error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR", "NOT_FOUND")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// RFC 3339 timestamp of when the error occurred
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
    /// Logging level follows severity: `error!` for 500s, `warn!` for
    /// authentication failures and conflicts, `debug!` for expected client errors.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let (code, message) = match self {
            ApiError::ValidationError(message) => {
                debug!("Validation error: {}", message);
                ("VALIDATION_ERROR", message.clone())
            }
            ApiError::NotFound { resource } => {
                debug!("Resource not found: {}", resource);
                ("NOT_FOUND", format!("{} not found", resource))
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);
                ("CONFLICT", message.clone())
            }
            ApiError::Unauthorized(message) => {
                warn!("Unauthorized access attempt: {}", message);
                ("UNAUTHORIZED", message.clone())
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                ("INTERNAL_ERROR", "An internal server error occurred".to_string())
            }
        };

        (
            self.status_code(),
            ErrorResponse {
                error_code: code.to_string(),
                message,
                timestamp: Utc::now().to_rfc3339(),
            },
        )
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
