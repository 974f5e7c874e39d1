//! bcrypt-backed credential verifier.

use super::{CredentialError, CredentialVerifier};
use crate::types::PasswordHash;

/// Verifier hashing with bcrypt at a fixed work factor.
///
/// bcrypt embeds a fresh random salt in every digest and compares in
/// constant time on verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcryptVerifier {
    cost: u32,
}

impl BcryptVerifier {
    /// Lowest work factor bcrypt accepts.
    pub const MIN_COST: u32 = 4;
    /// Highest work factor bcrypt accepts.
    pub const MAX_COST: u32 = 31;
    /// Work factor used when none is configured.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Create a verifier with the given work factor.
    ///
    /// An out-of-range cost is not rejected here; `hash` reports it as a
    /// `HashingFailure`. Configuration validates the range up front.
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// The configured work factor.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptVerifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}

impl CredentialVerifier for BcryptVerifier {
    fn hash(&self, secret: &str) -> Result<PasswordHash, CredentialError> {
        bcrypt::hash(secret, self.cost)
            .map(PasswordHash::from_stored)
            .map_err(|e| {
                tracing::warn!(cost = self.cost, "bcrypt hashing failed: {e}");
                CredentialError::HashingFailure(e.to_string())
            })
    }

    fn verify(&self, secret: &str, hash: &PasswordHash) -> Result<(), CredentialError> {
        match bcrypt::verify(secret, hash.as_str()) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CredentialError::InvalidCredentials),
            Err(e) => {
                tracing::debug!("stored digest rejected by bcrypt: {e}");
                Err(CredentialError::InvalidCredentials)
            }
        }
    }
}
