use axum::response::{IntoResponse, Response};

use crate::blob::BlobError;
use crate::db::StoreError;
use crate::error::ApiError;

/// Error types for employee operations
#[derive(Debug, thiserror::Error)]
pub enum EmployeeError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Absent, or owned by another account
    #[error("Employee not found")]
    NotFound,

    #[error("Employee with this {0} already exists")]
    Duplicate(&'static str),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EmployeeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { field } => EmployeeError::Duplicate(field),
            other => EmployeeError::Store(other),
        }
    }
}

impl From<EmployeeError> for ApiError {
    fn from(err: EmployeeError) -> Self {
        match err {
            EmployeeError::ValidationError(msg) => ApiError::ValidationError(msg),
            EmployeeError::NotFound => ApiError::NotFound {
                resource: "Employee".to_string(),
            },
            EmployeeError::Duplicate(field) => ApiError::Conflict {
                message: format!("Employee with this {} already exists", field),
            },
            EmployeeError::Blob(e @ (BlobError::UnsupportedType | BlobError::TooLarge)) => {
                ApiError::ValidationError(e.to_string())
            }
            EmployeeError::Blob(e) => ApiError::InternalError(e.to_string()),
            EmployeeError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for EmployeeError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
