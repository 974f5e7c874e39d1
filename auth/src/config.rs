//! Server configuration module.
//!
//! This module provides configuration loading for the auth server from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `AUTH_SIGNING_SECRET`: Token signing secret (required, non-empty)
//! - `AUTH_BCRYPT_COST`: Password hashing work factor (default: `12`, range 4-31)
//! - `AUTH_TOKEN_TTL_SECS`: Access token lifetime in seconds (default: `3600`)
//! - `AUTH_LISTEN_PORT`: Port to listen on (default: `3000`)
//!
//! # Invariants
//!
//! - `signing_secret` is never empty
//! - `bcrypt_cost` is always accepted by bcrypt
//! - `token_ttl_secs` is always positive

use crate::credentials::BcryptVerifier;
use crate::token::{DEFAULT_VALIDITY_SECS, SigningSecret};

const SIGNING_SECRET_VAR: &str = "AUTH_SIGNING_SECRET";
const BCRYPT_COST_VAR: &str = "AUTH_BCRYPT_COST";
const TOKEN_TTL_VAR: &str = "AUTH_TOKEN_TTL_SECS";
const LISTEN_PORT_VAR: &str = "AUTH_LISTEN_PORT";

/// Server configuration.
///
/// # Post-conditions
///
/// When constructed via `from_env()`, every field satisfies the module
/// invariants.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret used to sign and verify access tokens.
    pub signing_secret: SigningSecret,
    /// bcrypt work factor for new password digests.
    pub bcrypt_cost: u32,
    /// Lifetime of issued access tokens.
    pub token_ttl_secs: u64,
    /// Port to listen on for HTTP requests.
    pub listen_port: u16,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl AuthConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 3000;

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `AUTH_SIGNING_SECRET` is not set or is empty
    /// - any optional variable is set but out of range or unparseable
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Same as [`AuthConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            signing_secret: load_signing_secret(&lookup)?,
            bcrypt_cost: load_bcrypt_cost(&lookup)?,
            token_ttl_secs: load_token_ttl(&lookup)?,
            listen_port: load_listen_port(&lookup)?,
        })
    }
}

fn invalid(name: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message,
    }
}

fn load_signing_secret(
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<SigningSecret, ConfigError> {
    let secret = lookup(SIGNING_SECRET_VAR)
        .ok_or_else(|| ConfigError::MissingEnvVar(SIGNING_SECRET_VAR.to_string()))?;

    SigningSecret::new(secret.into_bytes()).map_err(|e| invalid(SIGNING_SECRET_VAR, e.to_string()))
}

fn load_bcrypt_cost(lookup: &impl Fn(&str) -> Option<String>) -> Result<u32, ConfigError> {
    let Some(value) = lookup(BCRYPT_COST_VAR) else {
        return Ok(BcryptVerifier::DEFAULT_COST);
    };

    let range = BcryptVerifier::MIN_COST..=BcryptVerifier::MAX_COST;
    match value.parse::<u32>() {
        Ok(cost) if range.contains(&cost) => Ok(cost),
        _ => Err(invalid(
            BCRYPT_COST_VAR,
            format!(
                "'{value}' is not a valid work factor (must be {}-{})",
                range.start(),
                range.end()
            ),
        )),
    }
}

fn load_token_ttl(lookup: &impl Fn(&str) -> Option<String>) -> Result<u64, ConfigError> {
    let Some(value) = lookup(TOKEN_TTL_VAR) else {
        return Ok(DEFAULT_VALIDITY_SECS);
    };

    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(invalid(
            TOKEN_TTL_VAR,
            format!("'{value}' is not a positive number of seconds"),
        )),
    }
}

fn load_listen_port(lookup: &impl Fn(&str) -> Option<String>) -> Result<u16, ConfigError> {
    let Some(value) = lookup(LISTEN_PORT_VAR) else {
        return Ok(AuthConfig::DEFAULT_PORT);
    };

    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(invalid(
            LISTEN_PORT_VAR,
            format!("'{value}' is not a valid port number (must be 1-65535)"),
        )),
    }
}
