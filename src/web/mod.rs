//! Web server module for the inbound webhook route.
//!
//! Exactly one data route exists per process: `POST /<secret-path>`, where
//! the secret path is the persisted 64-character hex token. A `/health`
//! probe sits alongside it for operations.

pub mod handlers;

pub use handlers::{
    health, puzzmo_webhook, relay_message, AppState, DiscordPayload, HealthResponse,
    RelayOutcome,
};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn build_router(webhook_path: &str, state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(&format!("/{}", webhook_path), post(puzzmo_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
