// Password hashing and validation service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::auth::error::AuthError;

/// Default work factor (Argon2 iteration count)
pub const DEFAULT_HASH_COST: u32 = 12;

/// Default Argon2 memory cost in KiB
pub const DEFAULT_HASH_MEMORY_KIB: u32 = Params::DEFAULT_M_COST;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash a password with Argon2id using `cost` iterations.
///
/// Fails only when the cost parameters are rejected by Argon2.
pub fn hash_password(password: &str, cost: u32, memory_kib: u32) -> Result<String, AuthError> {
    let params = Params::new(memory_kib, cost, Params::DEFAULT_P_COST, None)
        .map_err(|e| AuthError::PasswordHashError(e.to_string()))?;
    let salt = SaltString::generate(&mut OsRng);

    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHashError(e.to_string()))
}

/// Verify a password against a stored PHC hash.
///
/// The hash carries its own parameters; an unparsable hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Password service for hashing and verification
///
/// Hashing runs on the blocking pool so a slow hash never stalls other requests.
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
    memory_kib: u32,
}

impl PasswordService {
    /// Create a PasswordService, rejecting cost parameters Argon2 would refuse
    pub fn new(cost: u32, memory_kib: u32) -> Result<Self, AuthError> {
        Params::new(memory_kib, cost, Params::DEFAULT_P_COST, None)
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?;
        Ok(Self { cost, memory_kib })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password
    pub async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        let (cost, memory_kib) = (self.cost, self.memory_kib);

        tokio::task::spawn_blocking(move || hash_password(&password, cost, memory_kib))
            .await
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?
    }

    /// Verify a password against a hash
    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let (password, hash) = (password.to_owned(), hash.to_owned());

        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))
    }

    /// Validate password strength requirements
    pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self {
            cost: DEFAULT_HASH_COST,
            memory_kib: DEFAULT_HASH_MEMORY_KIB,
        }
    }
}
