// Authentication middleware for protected routes

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::auth::{
    error::AuthError,
    models::Identity,
    token::{TokenError, TokenService},
};
use crate::AppState;

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

/// Where the auth gate looks for the session token.
///
/// A deployment picks exactly one; the other location is never consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTransport {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// Cookie named `token`
    Cookie,
}

impl std::str::FromStr for TokenTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bearer" | "header" => Ok(TokenTransport::Bearer),
            "cookie" => Ok(TokenTransport::Cookie),
            other => Err(format!("unknown token transport '{}'", other)),
        }
    }
}

/// Pull the raw token out of the request headers.
///
/// `Ok(None)` means no credential was presented at all; a credential that is
/// present but unusable is `Err(InvalidCredential)`.
pub fn extract_token(headers: &HeaderMap, transport: TokenTransport) -> Result<Option<String>, AuthError> {
    match transport {
        TokenTransport::Bearer => {
            let Some(value) = headers.get(header::AUTHORIZATION) else {
                return Ok(None);
            };
            let value = value
                .to_str()
                .map_err(|_| AuthError::InvalidCredential(TokenError::Malformed))?;
            let token = value
                .strip_prefix("Bearer ")
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or(AuthError::InvalidCredential(TokenError::Malformed))?;
            Ok(Some(token.to_string()))
        }
        TokenTransport::Cookie => Ok(headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == TOKEN_COOKIE)
            .map(|(_, token)| token.trim().to_string())
            .filter(|token| !token.is_empty())),
    }
}

/// The auth gate: token extraction plus verification.
///
/// `Unauthenticated -> TokenExtracted -> Verified | Rejected`
pub struct AuthGate {
    token_service: Arc<TokenService>,
    transport: TokenTransport,
}

impl AuthGate {
    pub fn new(token_service: Arc<TokenService>, transport: TokenTransport) -> Self {
        Self {
            token_service,
            transport,
        }
    }

    pub fn transport(&self) -> TokenTransport {
        self.transport
    }

    /// Resolve the identity behind a request, checking expiry against `now`
    pub fn authenticate_at(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        // No token: reject without touching the codec
        let token = extract_token(headers, self.transport)?.ok_or(AuthError::MissingCredential)?;

        let claims = self
            .token_service
            .validate_token_at(&token, now)
            .map_err(AuthError::InvalidCredential)?;

        Ok(Identity::from(claims))
    }

    /// Resolve the identity behind a request
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        self.authenticate_at(headers, Utc::now())
    }
}

/// Middleware guarding protected routes.
///
/// On success the resolved [`Identity`] is inserted into the request's own
/// extensions and the next handler runs; on failure the request ends with a 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let endpoint = request.uri().path().to_string();

    let identity = state.gate.authenticate(request.headers()).map_err(|e| {
        warn!("Authentication failed for {}: {}", endpoint, e);
        e
    })?;

    debug!(
        "Authenticated account_id={} endpoint={}",
        identity.account_id, endpoint
    );
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Authenticated account extractor for handlers behind [`require_auth`]
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AuthError::MissingCredential)
    }
}
