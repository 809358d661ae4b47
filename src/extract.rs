// Request body extractors
// Wrap axum's JSON and multipart extractors so body rejections leave the
// service as `ApiError::ValidationError` instead of axum's plain-text replies

use axum::{
    async_trait,
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        FromRequest, Request,
    },
    Json,
};

use crate::error::ApiError;

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::ValidationError(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::ValidationError(format!("Invalid form data: {}", rejection.body_text()))
    }
}

/// JSON request body
///
/// Missing content type, unparsable JSON and wrongly typed fields are all 400s.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

/// `multipart/form-data` request body
pub struct FormBody(pub Multipart);

#[async_trait]
impl<S> FromRequest<S> for FormBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(FormBody(Multipart::from_request(req, state).await?))
    }
}
