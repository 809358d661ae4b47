// Runtime configuration read from the environment

use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::middleware::TokenTransport;
use crate::auth::password::{DEFAULT_HASH_COST, DEFAULT_HASH_MEMORY_KIB};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Which repositories back the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process memory; data is lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub store_backend: StoreBackend,
    /// Set whenever `store_backend` is `Postgres`
    pub database_url: Option<String>,
    pub token_transport: TokenTransport,
    pub cookie_secure: bool,
    pub hash_cost: u32,
    pub hash_memory_kib: u32,
    pub upload_dir: PathBuf,
    pub api_prefix: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let store_backend = parse_or("STORE_BACKEND", var("STORE_BACKEND"), StoreBackend::Postgres)?;
        let database_url = var("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let api_prefix = var("API_PREFIX").unwrap_or_else(|| "/api/user".to_string());
        if !api_prefix.starts_with('/') || api_prefix.len() < 2 {
            return Err(ConfigError::Invalid {
                name: "API_PREFIX",
                reason: "must start with '/' and name a path".to_string(),
            });
        }

        Ok(Self {
            jwt_secret,
            store_backend,
            database_url,
            token_transport: parse_or(
                "TOKEN_TRANSPORT",
                var("TOKEN_TRANSPORT"),
                TokenTransport::Bearer,
            )?,
            cookie_secure: parse_or("COOKIE_SECURE", var("COOKIE_SECURE"), true)?,
            hash_cost: parse_or("HASH_COST", var("HASH_COST"), DEFAULT_HASH_COST)?,
            hash_memory_kib: parse_or("HASH_MEMORY_KIB", var("HASH_MEMORY_KIB"), DEFAULT_HASH_MEMORY_KIB)?,
            upload_dir: var("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()).into(),
            api_prefix: api_prefix.trim_end_matches('/').to_string(),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", var("PORT"), 8080)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
