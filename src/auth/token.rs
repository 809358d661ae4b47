// JWT session token generation and validation service

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::models::Identity;

/// Session lifetime: one day
pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid, // account id
    pub name: String,
    pub email: String,
    pub iat: i64, // issued at timestamp
    pub exp: i64, // expiration timestamp
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            account_id: claims.sub,
            name: claims.name,
            email: claims.email,
        }
    }
}

/// Why a token was rejected. Only ever logged; clients see one generic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("signature does not verify")]
    SignatureInvalid,
    #[error("token has expired")]
    Expired,
}

/// A freshly minted token together with its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Token service for JWT operations
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a new TokenService with secret key
    /// Tokens expire one day after issue
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `validate_token_at` against an explicit clock,
        // at sub-second precision and without leeway.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::seconds(SESSION_TTL_SECS),
        }
    }

    /// Generate a session token for `identity`, issued now
    pub fn generate_token(&self, identity: &Identity) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        self.generate_token_at(identity, Utc::now())
    }

    /// Generate a session token for `identity`, issued at `now`
    pub fn generate_token_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let iat = now.timestamp();
        let exp = iat + self.ttl.num_seconds();

        let claims = Claims {
            sub: identity.account_id,
            name: identity.name.clone(),
            email: identity.email.clone(),
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        let expires_at = Utc.timestamp_opt(exp, 0).single().unwrap_or(now + self.ttl);

        Ok(IssuedToken { token, expires_at })
    }

    /// Validate a session token against the current time
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Validate a session token against `now`.
    ///
    /// A token is valid while `now < exp`.
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        let expires_at = claims.expires_at().ok_or(TokenError::Malformed)?;
        if now >= expires_at {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
