//! Identifier and credential types shared across the crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An opaque user key.
///
/// Serializes as a bare number in JSON bodies. Inside tokens it travels as
/// the decimal string in the `sub` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// Get the underlying numeric key.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A salted one-way password digest in bcrypt modular-crypt form.
///
/// # Invariants
///
/// - The plaintext is never recoverable from this value.
/// - Only `CredentialVerifier::verify` interprets the contents.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a digest loaded from storage.
    ///
    /// No validation happens here; a malformed digest simply never verifies.
    #[must_use]
    pub const fn from_stored(digest: String) -> Self {
        Self(digest)
    }

    /// The digest as text, for storage.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The digest as raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// A stored credential: the user key, login email, and password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Key of the user owning this credential.
    pub user_id: UserId,
    /// Login identifier.
    pub email: String,
    /// Digest of the user's password.
    pub secret_hash: PasswordHash,
}
