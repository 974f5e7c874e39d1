//! Test doubles for the credential, storage, and token capabilities.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::credentials::{CredentialError, CredentialVerifier};
use crate::store::{CredentialStore, CredentialStoreError};
use crate::token::{Claims, TokenError, TokenService};
use crate::types::{CredentialRecord, PasswordHash, UserId};

/// Cheap verifier storing `fake$<salt>$<secret>`.
///
/// Counts verifications so tests can check that both login failure paths
/// do the same amount of work.
#[derive(Debug, Default)]
pub struct FakeVerifier {
    salt: AtomicU64,
    verify_calls: AtomicUsize,
}

impl FakeVerifier {
    #[must_use]
    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

impl CredentialVerifier for FakeVerifier {
    fn hash(&self, secret: &str) -> Result<PasswordHash, CredentialError> {
        let salt = self.salt.fetch_add(1, Ordering::SeqCst);
        Ok(PasswordHash::from_stored(format!("fake${salt}${secret}")))
    }

    fn verify(&self, secret: &str, hash: &PasswordHash) -> Result<(), CredentialError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let stored = hash
            .as_str()
            .strip_prefix("fake$")
            .and_then(|rest| rest.split_once('$'))
            .map(|(_, stored)| stored);

        if stored == Some(secret) {
            Ok(())
        } else {
            Err(CredentialError::InvalidCredentials)
        }
    }
}

/// Verifier whose hashing primitive always fails.
#[derive(Debug, Default)]
pub struct FailingVerifier;

impl CredentialVerifier for FailingVerifier {
    fn hash(&self, _secret: &str) -> Result<PasswordHash, CredentialError> {
        Err(CredentialError::HashingFailure("injected failure".to_string()))
    }

    fn verify(&self, _secret: &str, _hash: &PasswordHash) -> Result<(), CredentialError> {
        Err(CredentialError::InvalidCredentials)
    }
}

/// Store that is always unavailable.
#[derive(Debug, Default)]
pub struct UnavailableStore;

impl CredentialStore for UnavailableStore {
    fn find_by_email(
        &self,
        _email: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        Err(CredentialStoreError::Unavailable("injected failure".to_string()))
    }

    fn insert(
        &self,
        _email: &str,
        _secret_hash: PasswordHash,
    ) -> Result<CredentialRecord, CredentialStoreError> {
        Err(CredentialStoreError::Unavailable("injected failure".to_string()))
    }
}

/// Token service issuing `token-<id>` strings.
///
/// `expired-<id>` validates as expired; anything else is malformed.
#[derive(Debug, Default)]
pub struct FakeTokenService {
    /// When set, issuance fails with `TokenSigningFailure`.
    pub fail_signing: bool,
}

impl TokenService for FakeTokenService {
    fn issue_token(&self, subject: UserId) -> Result<String, TokenError> {
        if self.fail_signing {
            return Err(TokenError::TokenSigningFailure("injected failure".to_string()));
        }
        Ok(format!("token-{subject}"))
    }

    fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        if token.starts_with("expired-") {
            return Err(TokenError::TokenExpired);
        }
        let subject = token
            .strip_prefix("token-")
            .and_then(|id| id.parse::<UserId>().ok())
            .ok_or(TokenError::MalformedToken)?;

        Ok(Claims {
            subject,
            issued_at: 0,
            expires_at: u64::MAX,
        })
    }
}
