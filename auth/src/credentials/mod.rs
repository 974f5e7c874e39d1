//! Credential verification.
//!
//! Turns plaintext passwords into salted one-way digests and checks
//! plaintext against stored digests.
//!
//! # Invariants
//! - Plaintext is never reconstructed from a digest.
//! - A malformed digest is a failed verification, never a panic.

mod bcrypt_verifier;

pub use bcrypt_verifier::BcryptVerifier;

use crate::types::PasswordHash;

/// Error returned by credential operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The secret does not match the digest, or the digest is unusable.
    InvalidCredentials,
    /// The hashing primitive failed (bad cost, salt generation, resources).
    HashingFailure(String),
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::HashingFailure(reason) => write!(f, "password hashing failed: {reason}"),
        }
    }
}

impl std::error::Error for CredentialError {}

/// Password hashing and verification capability.
///
/// Production code uses [`BcryptVerifier`]; tests substitute cheaper fakes.
pub trait CredentialVerifier: Send + Sync {
    /// Derive a salted digest of `secret`.
    ///
    /// # Post-conditions
    /// - Two calls with the same `secret` return different digests.
    /// - Every returned digest verifies against `secret`.
    ///
    /// # Errors
    /// Returns `CredentialError::HashingFailure` if the primitive fails.
    fn hash(&self, secret: &str) -> Result<PasswordHash, CredentialError>;

    /// Check `secret` against `hash` using the salt embedded in `hash`.
    ///
    /// # Errors
    /// Returns `CredentialError::InvalidCredentials` on mismatch or when
    /// `hash` is malformed.
    fn verify(&self, secret: &str, hash: &PasswordHash) -> Result<(), CredentialError>;
}
