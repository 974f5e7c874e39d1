//! Access token issuance and validation.
//!
//! # Pre-conditions
//! - The signing secret is non-empty.
//!
//! # Post-conditions
//! - Every issued token expires `validity window` seconds after issuance.
//!
//! # Invariants
//! - The signature is checked before any claim is trusted.
//! - A token is rejected at the exact expiry second, with no leeway.
//! - Issuance and validation keep no state besides the signing secret.

mod jwt;

pub use jwt::JwtTokenService;

use crate::types::UserId;

/// Default lifetime of an access token (1 hour).
pub const DEFAULT_VALIDITY_SECS: u64 = 60 * 60;

/// Error returned when a token cannot be issued or accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The input is not a well-formed token.
    MalformedToken,
    /// The integrity tag does not verify under the current signing secret.
    InvalidSignature,
    /// The token reached its expiry time.
    TokenExpired,
    /// The signing primitive failed.
    TokenSigningFailure(String),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedToken => write!(f, "malformed token"),
            Self::InvalidSignature => write!(f, "invalid token signature"),
            Self::TokenExpired => write!(f, "token has expired"),
            Self::TokenSigningFailure(reason) => write!(f, "token signing failed: {reason}"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Claims bound into an access token.
///
/// # Invariants
/// - `expires_at = issued_at + validity window` for tokens issued here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    /// The user the token was issued to.
    pub subject: UserId,
    /// Issuance time, seconds since Unix epoch.
    pub issued_at: u64,
    /// First second at which the token is no longer valid.
    pub expires_at: u64,
}

impl Claims {
    /// Whether the token is expired at `now_secs`.
    #[must_use]
    pub const fn is_expired_at(&self, now_secs: u64) -> bool {
        now_secs >= self.expires_at
    }
}

/// Error returned when a signing secret is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningSecretError {
    /// The secret is empty.
    Empty,
}

impl std::fmt::Display for SigningSecretError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "signing secret must not be empty"),
        }
    }
}

impl std::error::Error for SigningSecretError {}

/// Symmetric key used to sign and verify tokens.
///
/// Loaded once at startup and handed to the token service at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Wrap raw key material.
    ///
    /// # Errors
    /// Returns `SigningSecretError::Empty` if `secret` is empty.
    pub fn new(secret: Vec<u8>) -> Result<Self, SigningSecretError> {
        if secret.is_empty() {
            return Err(SigningSecretError::Empty);
        }
        Ok(Self(secret))
    }

    /// The raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}

/// Token issuance and validation capability.
///
/// Production code uses [`JwtTokenService`]; tests substitute fakes.
pub trait TokenService: Send + Sync {
    /// Issue a token bound to `subject`.
    ///
    /// # Errors
    /// Returns `TokenError::TokenSigningFailure` if signing fails.
    fn issue_token(&self, subject: UserId) -> Result<String, TokenError>;

    /// Validate `token` and return its claims.
    ///
    /// # Errors
    /// - `TokenError::MalformedToken` if `token` cannot be parsed.
    /// - `TokenError::InvalidSignature` if the signature does not verify.
    /// - `TokenError::TokenExpired` if the token's expiry has been reached.
    fn validate_token(&self, token: &str) -> Result<Claims, TokenError>;
}
