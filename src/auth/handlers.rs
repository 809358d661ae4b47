// HTTP handlers for authentication endpoints

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};

use crate::auth::{
    middleware::{TokenTransport, TOKEN_COOKIE},
    models::{
        AccountResponse, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
        RegisterResponse, ResetPasswordRequest,
    },
    token::SESSION_TTL_SECS,
};
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::AppState;

/// Build the `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, expires_at: DateTime<Utc>, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}; Expires={}",
        TOKEN_COOKIE,
        token,
        SESSION_TTL_SECS,
        expires_at.format("%a, %d %b %Y %H:%M:%S GMT")
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Register a new account
/// POST /signup
#[utoipa::path(
    post,
    path = "/api/user/signup",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing fields or password too short", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let account = state.auth_service.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".to_string(),
            user: AccountResponse::from(account),
        }),
    ))
}

/// Login an account
/// POST /login
///
/// The token is always returned in the body; with cookie transport it is also
/// set as the `token` cookie.
#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing fields", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid email or password", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Response, ApiError> {
    let outcome = state.auth_service.login(request).await?;

    let cookie = match state.gate.transport() {
        TokenTransport::Cookie => Some(
            HeaderValue::from_str(&session_cookie(
                &outcome.token.token,
                outcome.token.expires_at,
                state.cookie_secure,
            ))
            .map_err(|e| ApiError::InternalError(format!("session cookie: {}", e)))?,
        ),
        TokenTransport::Bearer => None,
    };

    let mut response = Json(LoginResponse {
        message: "User logged in successfully".to_string(),
        token: outcome.token.token,
        expires_at: outcome.token.expires_at,
        user: AccountResponse::from(outcome.account),
    })
    .into_response();

    if let Some(cookie) = cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

/// Reset an account password
/// POST /forgotpassword
#[utoipa::path(
    post,
    path = "/api/user/forgotpassword",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Missing fields, short or mismatched password", body = crate::error::ErrorResponse),
        (status = 404, description = "No account with that email", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn reset_password_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.reset_password(request).await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}
