//! HS256 JSON Web Token implementation of `TokenService`.
//!
//! Tokens are compact `header.payload.signature` strings. The signature is
//! HMAC-SHA256 over the encoded header and payload.
//!
//! # Pre-conditions
//! - The signing secret is non-empty (enforced by `SigningSecret`).
//!
//! # Post-conditions
//! - On success, validation returns the claims with the bound subject.
//! - On failure, validation returns which check rejected the token.
//!
//! # Invariants
//! - Expiry is evaluated against the injected `TimeSource`, never by the
//!   JWT library, so that the boundary is exactly `now >= exp`.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::{Claims, SigningSecret, TokenError, TokenService};
use crate::time::{SystemTimeSource, TimeSource};
use crate::types::UserId;

/// Claims as they appear in the token payload.
///
/// `sub` is a string per RFC 7519.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    iat: u64,
    exp: u64,
}

impl From<&Claims> for WireClaims {
    fn from(claims: &Claims) -> Self {
        Self {
            sub: claims.subject.to_string(),
            iat: claims.issued_at,
            exp: claims.expires_at,
        }
    }
}

impl TryFrom<WireClaims> for Claims {
    type Error = TokenError;

    fn try_from(wire: WireClaims) -> Result<Self, Self::Error> {
        let subject = wire
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::MalformedToken)?;
        Ok(Self {
            subject,
            issued_at: wire.iat,
            expires_at: wire.exp,
        })
    }
}

/// Token service signing HS256 JWTs with a process-wide secret.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity_secs: u64,
    time: Arc<dyn TimeSource>,
}

impl JwtTokenService {
    /// Create a service reading the system clock.
    #[must_use]
    pub fn new(secret: &SigningSecret, validity_secs: u64) -> Self {
        Self::with_time_source(secret, validity_secs, Arc::new(SystemTimeSource))
    }

    /// Create a service reading time from `time`.
    #[must_use]
    pub fn with_time_source(
        secret: &SigningSecret,
        validity_secs: u64,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our own clock after decoding.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validity_secs,
            time,
        }
    }

    /// Lifetime of issued tokens in seconds.
    #[must_use]
    pub const fn validity_secs(&self) -> u64 {
        self.validity_secs
    }
}

impl TokenService for JwtTokenService {
    fn issue_token(&self, subject: UserId) -> Result<String, TokenError> {
        let issued_at = self.time.now_secs();
        let claims = Claims {
            subject,
            issued_at,
            expires_at: issued_at.saturating_add(self.validity_secs),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &WireClaims::from(&claims),
            &self.encoding_key,
        )
        .map_err(|e| {
            tracing::warn!(%subject, "failed to sign token: {e}");
            TokenError::TokenSigningFailure(e.to_string())
        })?;

        tracing::debug!(%subject, expires_at = claims.expires_at, "issued token");
        Ok(token)
    }

    fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        // decode() checks the signature over header and payload before it
        // deserializes the payload.
        let token_data = decode::<WireClaims>(token, &self.decoding_key, &self.validation)
            .map_err(map_jwt_error)?;
        let claims = Claims::try_from(token_data.claims)?;

        if claims.is_expired_at(self.time.now_secs()) {
            return Err(TokenError::TokenExpired);
        }

        Ok(claims)
    }
}

/// Maps jsonwebtoken errors to our `TokenError` type.
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::MalformedToken,
    }
}
