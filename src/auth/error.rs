// Authentication and authorization error types

use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::auth::token::TokenError;
use crate::db::StoreError;
use crate::error::ApiError;

/// Message returned for every session failure, whatever the cause.
pub const NOT_AUTHORIZED: &str = "Not authorized";

/// Message returned for every failed login, whatever the cause.
pub const INVALID_LOGIN: &str = "Invalid email or password";

/// Authentication and authorization error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("email already registered")]
    EmailAlreadyExists,

    /// Unknown email or wrong password; deliberately a single variant
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("account not found")]
    AccountNotFound,

    /// The auth gate found no token in the configured transport
    #[error("missing session token")]
    MissingCredential,

    /// The auth gate found a token the codec rejected
    #[error("invalid session token: {0}")]
    InvalidCredential(TokenError),

    #[error("password hashing error: {0}")]
    PasswordHashError(String),

    #[error("token generation error: {0}")]
    TokenGenerationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::ValidationError(msg) => ApiError::ValidationError(msg),
            AuthError::EmailAlreadyExists => ApiError::Conflict {
                message: "User already exists".to_string(),
            },
            AuthError::InvalidCredentials => ApiError::Unauthorized(INVALID_LOGIN.to_string()),
            AuthError::AccountNotFound => ApiError::NotFound {
                resource: "User".to_string(),
            },
            AuthError::MissingCredential => {
                debug!("Rejected request without session token");
                ApiError::Unauthorized(NOT_AUTHORIZED.to_string())
            }
            AuthError::InvalidCredential(reason) => {
                warn!("Rejected session token: {}", reason);
                ApiError::Unauthorized(NOT_AUTHORIZED.to_string())
            }
            AuthError::PasswordHashError(msg) => {
                ApiError::InternalError(format!("password hashing: {}", msg))
            }
            AuthError::TokenGenerationError(msg) => {
                ApiError::InternalError(format!("token generation: {}", msg))
            }
            AuthError::Store(StoreError::Duplicate { .. }) => ApiError::Conflict {
                message: "User already exists".to_string(),
            },
            AuthError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
