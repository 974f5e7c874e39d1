#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::net::SocketAddr;
use std::sync::Arc;

use auth::{
    Authenticator, BcryptVerifier, InMemoryCredentialStore, JwtTokenService,
    api::{self, AppState},
    config::AuthConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match AuthConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: bcrypt_cost={}, token_ttl_secs={}, listen_port={}",
        config.bcrypt_cost,
        config.token_ttl_secs,
        config.listen_port
    );

    // The signing secret is read once here and owned by the token service
    // for the rest of the process.
    let tokens = JwtTokenService::new(&config.signing_secret, config.token_ttl_secs);

    let authenticator = match Authenticator::new(
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(BcryptVerifier::new(config.bcrypt_cost)),
    ) {
        Ok(authenticator) => authenticator,
        Err(e) => {
            tracing::error!("Failed to initialize authenticator: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState {
        authenticator: Arc::new(authenticator),
        tokens: Arc::new(tokens),
    };
    let app = api::router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.listen_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    });
}
