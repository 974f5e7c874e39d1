//! Credential storage capability and an in-memory implementation.
//!
//! The authentication core only needs to look credentials up by email and
//! insert new ones. Durable storage lives behind `CredentialStore`; the
//! in-memory store backs the bundled server and the tests.
//!
//! # Thread Safety
//!
//! `InMemoryCredentialStore` guards its map with `RwLock`, so concurrent
//! logins only take read locks.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::types::{CredentialRecord, PasswordHash, UserId};

/// Errors that can occur when accessing credential storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialStoreError {
    /// A credential already exists for this email.
    EmailTaken(String),
    /// The store could not serve the request.
    Unavailable(String),
}

impl std::fmt::Display for CredentialStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailTaken(email) => write!(f, "email already registered: {email}"),
            Self::Unavailable(reason) => write!(f, "credential store unavailable: {reason}"),
        }
    }
}

impl std::error::Error for CredentialStoreError {}

/// Lookup and insertion of credential records.
pub trait CredentialStore: Send + Sync {
    /// Find the credential registered under `email`.
    ///
    /// Returns `Ok(None)` when no such credential exists.
    fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, CredentialStoreError>;

    /// Insert a credential for `email` and assign it a fresh `UserId`.
    ///
    /// # Errors
    /// Returns `CredentialStoreError::EmailTaken` if `email` is registered.
    fn insert(
        &self,
        email: &str,
        secret_hash: PasswordHash,
    ) -> Result<CredentialRecord, CredentialStoreError>;
}

#[derive(Debug, Default)]
struct Inner {
    by_email: HashMap<String, CredentialRecord>,
    last_id: u64,
}

/// Process-local credential store.
///
/// # Invariants
/// - Emails are unique.
/// - User ids are assigned sequentially starting at 1 and never reused.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credentials.
    ///
    /// # Errors
    /// Returns `CredentialStoreError::Unavailable` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, CredentialStoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.by_email.len())
    }

    /// Whether the store holds no credentials.
    ///
    /// # Errors
    /// Returns `CredentialStoreError::Unavailable` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, CredentialStoreError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> CredentialStoreError {
    CredentialStoreError::Unavailable("lock poisoned".to_string())
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.by_email.get(email).cloned())
    }

    // The write lock must cover the check and the insert.
    #[allow(clippy::significant_drop_tightening)]
    fn insert(
        &self,
        email: &str,
        secret_hash: PasswordHash,
    ) -> Result<CredentialRecord, CredentialStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;

        if inner.by_email.contains_key(email) {
            return Err(CredentialStoreError::EmailTaken(email.to_string()));
        }

        inner.last_id += 1;
        let record = CredentialRecord {
            user_id: UserId(inner.last_id),
            email: email.to_string(),
            secret_hash,
        };
        inner.by_email.insert(email.to_string(), record.clone());

        Ok(record)
    }
}
