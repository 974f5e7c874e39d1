// Life of a login:
// 1. Email and password come in
// 2. Look up the credential record by email
// 3. Verify the password against the stored bcrypt digest
//    - Unknown email: verify against a dummy digest, then reject
//    - Mismatch: reject with the same error
// 4. Sign an access token bound to the user id
//
// Life of an authenticated request:
// 1. Bearer token comes in
// 2. Check the signature under the process signing secret
// 3. Check expiry against the clock
// 4. Hand the bound user id to the caller
//
// System components:
//  - Credential verifier (bcrypt)
//  - Token service (HS256 JWT)
//  - Authenticator gluing the verifier to a credential store
//  - HTTP surface

pub mod api;
pub mod authenticator;
pub mod config;
pub mod credentials;
pub mod store;
pub mod time;
pub mod token;
pub mod types;

#[cfg(test)]
mod testing;

pub use authenticator::{AuthError, Authenticator};
pub use credentials::{BcryptVerifier, CredentialError, CredentialVerifier};
pub use store::{CredentialStore, CredentialStoreError, InMemoryCredentialStore};
pub use token::{Claims, JwtTokenService, SigningSecret, TokenError, TokenService};
pub use types::{CredentialRecord, PasswordHash, UserId};
