//! HTTP surface over the authentication core.
//!
//! - `POST /users` registers an email/password pair.
//! - `POST /login` exchanges an email/password pair for an access token.
//! - `GET /me` returns the identity bound to a bearer token.
//!
//! Status codes are chosen here and only here: credential and token failures
//! become 401, primitive and storage failures become 500.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::authenticator::{AuthError, Authenticator};
use crate::token::{TokenError, TokenService};
use crate::types::UserId;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Login and registration.
    pub authenticator: Arc<Authenticator>,
    /// Token issuance and validation.
    pub tokens: Arc<dyn TokenService>,
}

/// Body of `POST /users` and `POST /login`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    id: UserId,
    email: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Serialize)]
struct MeResponse {
    user_id: UserId,
    expires_at: u64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// An error rendered as `{"error": message}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    const fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, "invalid email or password")
            }
            AuthError::EmailTaken => Self::new(StatusCode::CONFLICT, "email already registered"),
            AuthError::InvalidInput(_) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid email or password format")
            }
            AuthError::HashingFailure(_) | AuthError::CredentialLookupFailure(_) => {
                Self::internal()
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::TokenSigningFailure(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "could not generate token",
            ),
            TokenError::MalformedToken
            | TokenError::InvalidSignature
            | TokenError::TokenExpired => {
                Self::new(StatusCode::UNAUTHORIZED, "invalid or expired token")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // Syntax, shape, and content-type problems all surface as 400.
        tracing::debug!("rejected request body: {rejection}");
        Self::new(StatusCode::BAD_REQUEST, "invalid request body")
    }
}

/// Build the router serving the auth endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/users", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .with_state(state)
}

/// Run a password-hashing closure on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| {
            tracing::error!("credential task failed: {e}");
            ApiError::internal()
        })?
        .map_err(ApiError::from)
}

async fn register(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(request) = body?;
    let authenticator = Arc::clone(&state.authenticator);
    let record =
        run_blocking(move || authenticator.register_user(&request.email, &request.password))
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: record.user_id,
            email: record.email,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = body?;
    let authenticator = Arc::clone(&state.authenticator);
    let user_id =
        run_blocking(move || authenticator.authenticate_user(&request.email, &request.password))
            .await?;

    let token = state.tokens.issue_token(user_id)?;
    Ok(Json(LoginResponse { token }))
}

async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "missing bearer token"))?;
    let claims = state.tokens.validate_token(token).map_err(|e| {
        tracing::debug!("rejected token: {e}");
        ApiError::from(e)
    })?;

    Ok(Json(MeResponse {
        user_id: claims.subject,
        expires_at: claims.expires_at,
    }))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
