//! Login and registration orchestration.
//!
//! Resolves an email through the credential store and delegates the secret
//! check to the credential verifier. Token issuance is left to the caller.
//!
//! # Invariants
//! - An unknown email and a wrong password fail with the same error, emit the
//!   same log event, and perform one verification each.
//! - Plaintext secrets are never logged or stored.

use std::sync::Arc;

use crate::credentials::{CredentialError, CredentialVerifier};
use crate::store::{CredentialStore, CredentialStoreError};
use crate::types::{CredentialRecord, PasswordHash, UserId};

/// Secret hashed once at startup so unknown-email logins pay for a real
/// verification.
const DUMMY_SECRET: &str = "dummy-secret-for-unknown-users";

/// Error returned by login and registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password; deliberately indistinguishable.
    InvalidCredentials,
    /// The password hashing primitive failed.
    HashingFailure(String),
    /// The credential store could not be read or written.
    CredentialLookupFailure(String),
    /// Registration for an email that already has a credential.
    EmailTaken,
    /// Registration input failed validation.
    InvalidInput(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::HashingFailure(reason) => write!(f, "password hashing failed: {reason}"),
            Self::CredentialLookupFailure(reason) => {
                write!(f, "credential lookup failed: {reason}")
            }
            Self::EmailTaken => write!(f, "email already registered"),
            Self::InvalidInput(reason) => write!(f, "invalid input: {reason}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<CredentialError> for AuthError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::InvalidCredentials => Self::InvalidCredentials,
            CredentialError::HashingFailure(reason) => Self::HashingFailure(reason),
        }
    }
}

impl From<CredentialStoreError> for AuthError {
    fn from(e: CredentialStoreError) -> Self {
        match e {
            CredentialStoreError::EmailTaken(_) => Self::EmailTaken,
            CredentialStoreError::Unavailable(reason) => Self::CredentialLookupFailure(reason),
        }
    }
}

/// Checks email/password pairs against stored credentials.
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    verifier: Arc<dyn CredentialVerifier>,
    dummy_hash: PasswordHash,
}

impl Authenticator {
    /// Create an authenticator over `store` and `verifier`.
    ///
    /// # Post-conditions
    /// - A dummy digest has been computed with the verifier's work factor.
    ///
    /// # Errors
    /// Returns `AuthError::HashingFailure` if the dummy digest cannot be
    /// computed, which also means no real password could be hashed.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Result<Self, AuthError> {
        let dummy_hash = verifier.hash(DUMMY_SECRET)?;
        Ok(Self {
            store,
            verifier,
            dummy_hash,
        })
    }

    /// Create a credential for `email`, hashing `secret`.
    ///
    /// # Errors
    /// - `AuthError::InvalidInput` if the email or secret is unusable.
    /// - `AuthError::EmailTaken` if the email is already registered.
    /// - `AuthError::HashingFailure` if hashing fails.
    /// - `AuthError::CredentialLookupFailure` if the store fails.
    pub fn register_user(&self, email: &str, secret: &str) -> Result<CredentialRecord, AuthError> {
        let email = normalize_email(email);
        validate_registration(email, secret)?;

        let secret_hash = self.verifier.hash(secret)?;
        let record = self.store.insert(email, secret_hash).map_err(|e| {
            if matches!(e, CredentialStoreError::Unavailable(_)) {
                tracing::warn!("failed to store credential: {e}");
            }
            AuthError::from(e)
        })?;

        tracing::info!(user_id = %record.user_id, "registered user");
        Ok(record)
    }

    /// Resolve `email` and check `secret` against its stored digest.
    ///
    /// # Errors
    /// - `AuthError::InvalidCredentials` for an unknown email or a wrong secret.
    /// - `AuthError::CredentialLookupFailure` if the store fails.
    pub fn authenticate_user(&self, email: &str, secret: &str) -> Result<UserId, AuthError> {
        let record = self.store.find_by_email(normalize_email(email)).map_err(|e| {
            tracing::warn!("credential lookup failed: {e}");
            AuthError::from(e)
        })?;

        let Some(record) = record else {
            // Same cost as a real mismatch; the outcome is irrelevant.
            let _ = self.verifier.verify(secret, &self.dummy_hash);
            return Err(rejected());
        };

        match self.verifier.verify(secret, &record.secret_hash) {
            Ok(()) => {
                tracing::debug!(user_id = %record.user_id, "authenticated user");
                Ok(record.user_id)
            }
            Err(CredentialError::InvalidCredentials) => Err(rejected()),
            Err(e) => Err(e.into()),
        }
    }
}

fn rejected() -> AuthError {
    tracing::info!("login rejected");
    AuthError::InvalidCredentials
}

/// Canonical form of an email used for both storage and lookup.
fn normalize_email(email: &str) -> &str {
    email.trim()
}

fn validate_registration(email: &str, secret: &str) -> Result<(), AuthError> {
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::InvalidInput("email must be a valid address".to_string()));
    }
    if secret.is_empty() {
        return Err(AuthError::InvalidInput("password must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::BcryptVerifier;
    use crate::store::InMemoryCredentialStore;
    use crate::testing::{FailingVerifier, FakeVerifier, UnavailableStore};

    fn fake_authenticator() -> (Authenticator, Arc<FakeVerifier>) {
        let verifier = Arc::new(FakeVerifier::default());
        let authenticator = Authenticator::new(
            Arc::new(InMemoryCredentialStore::new()),
            Arc::clone(&verifier) as Arc<dyn CredentialVerifier>,
        )
        .expect("authenticator");
        (authenticator, verifier)
    }

    #[test]
    fn test_login_scenario_with_bcrypt() {
        let authenticator = Authenticator::new(
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(BcryptVerifier::new(BcryptVerifier::MIN_COST)),
        )
        .expect("authenticator");
        let record = authenticator.register_user("a@x.com", "pw1").expect("register");

        assert_eq!(
            authenticator.authenticate_user("a@x.com", "pw1"),
            Ok(record.user_id)
        );
        assert_eq!(
            authenticator.authenticate_user("a@x.com", "wrong"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_unknown_email_matches_wrong_password() {
        let (authenticator, _) = fake_authenticator();
        authenticator.register_user("a@x.com", "pw1").expect("register");

        let unknown = authenticator.authenticate_user("nobody@x.com", "pw1");
        let wrong = authenticator.authenticate_user("a@x.com", "wrong");

        assert_eq!(unknown, Err(AuthError::InvalidCredentials));
        assert_eq!(unknown, wrong);
    }

    #[test]
    fn test_unknown_email_still_verifies_once() {
        let (authenticator, verifier) = fake_authenticator();
        authenticator.register_user("a@x.com", "pw1").expect("register");

        let before = verifier.verify_calls();
        let _ = authenticator.authenticate_user("nobody@x.com", "pw1");
        let after_unknown = verifier.verify_calls();
        let _ = authenticator.authenticate_user("a@x.com", "wrong");
        let after_wrong = verifier.verify_calls();

        assert_eq!(after_unknown - before, 1);
        assert_eq!(after_wrong - after_unknown, 1);
    }

    #[test]
    fn test_unknown_email_with_dummy_secret_is_rejected() {
        let (authenticator, _) = fake_authenticator();

        assert_eq!(
            authenticator.authenticate_user("nobody@x.com", DUMMY_SECRET),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_store_failure_is_not_invalid_credentials() {
        let authenticator = Authenticator::new(
            Arc::new(UnavailableStore),
            Arc::new(FakeVerifier::default()),
        )
        .expect("authenticator");

        let result = authenticator.authenticate_user("a@x.com", "pw1");
        assert!(matches!(result, Err(AuthError::CredentialLookupFailure(_))));
    }

    #[test]
    fn test_hashing_failure_surfaces_at_construction() {
        let result = Authenticator::new(
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(FailingVerifier),
        );
        assert!(matches!(result, Err(AuthError::HashingFailure(_))));
    }

    #[test]
    fn test_register_duplicate_email() {
        let (authenticator, _) = fake_authenticator();
        authenticator.register_user("a@x.com", "pw1").expect("register");

        assert_eq!(
            authenticator.register_user("a@x.com", "pw2"),
            Err(AuthError::EmailTaken)
        );
        // The original credential is untouched.
        assert!(authenticator.authenticate_user("a@x.com", "pw1").is_ok());
    }

    #[test]
    fn test_padded_email_maps_to_one_account() {
        let (authenticator, _) = fake_authenticator();
        let record = authenticator
            .register_user(" a@x.com ", "pw1")
            .expect("register");

        assert_eq!(record.email, "a@x.com");
        assert_eq!(
            authenticator.authenticate_user("a@x.com", "pw1"),
            Ok(record.user_id)
        );
        assert_eq!(
            authenticator.authenticate_user("\ta@x.com\n", "pw1"),
            Ok(record.user_id)
        );
        assert_eq!(
            authenticator.register_user("a@x.com", "pw2"),
            Err(AuthError::EmailTaken)
        );
    }

    #[test]
    fn test_register_rejects_invalid_input() {
        let (authenticator, _) = fake_authenticator();

        assert!(matches!(
            authenticator.register_user("", "pw"),
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            authenticator.register_user("not-an-email", "pw"),
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            authenticator.register_user("a@x.com", ""),
            Err(AuthError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_register_stores_digest_not_plaintext() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let authenticator = Authenticator::new(
            Arc::clone(&store) as Arc<dyn CredentialStore>,
            Arc::new(BcryptVerifier::new(BcryptVerifier::MIN_COST)),
        )
        .expect("authenticator");
        authenticator.register_user("a@x.com", "pw1").expect("register");

        let record = store
            .find_by_email("a@x.com")
            .expect("lookup")
            .expect("record exists");
        assert_ne!(record.secret_hash.as_bytes(), b"pw1");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "invalid credentials");
        assert_eq!(AuthError::EmailTaken.to_string(), "email already registered");
        assert_eq!(
            AuthError::CredentialLookupFailure("down".to_string()).to_string(),
            "credential lookup failed: down"
        );
        assert_eq!(
            AuthError::InvalidInput("bad".to_string()).to_string(),
            "invalid input: bad"
        );
    }
}
