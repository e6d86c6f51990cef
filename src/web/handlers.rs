//! Webhook endpoint handlers.
//!
//! The webhook handler does as little as possible before answering:
//! 1. Read the body
//! 2. Return 200 "Webhook received"
//! 3. Relay to Signal on a per-request task
//!
//! The source only needs confirmation that the request arrived; everything
//! after the acknowledgment is logged, never surfaced, never retried.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::plaintext::to_plain_text;
use crate::signal::SignalClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub signal: SignalClient,
    pub preserve_markdown: bool,
}

impl AppState {
    pub fn new(signal: SignalClient, preserve_markdown: bool) -> Self {
        Self {
            signal,
            preserve_markdown,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Puzzmo Webhook
// =============================================================================

/// Inbound webhook payload.
///
/// Puzzmo posts Discord-compatible webhooks; only the `content` field is
/// interpreted.
#[derive(Debug, Deserialize)]
pub struct DiscordPayload {
    #[serde(default)]
    pub content: String,
}

/// Terminal state of one relay attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered,
    InvalidPayload,
    NormalizeFailed,
    DeliveryFailed,
}

/// Puzzmo webhook endpoint.
///
/// Always answers 200 once the body has been read; the relay runs on its own
/// task and its outcome is invisible to the caller. Non-POST methods get 405
/// and an unreadable body gets 400, both from the router/extractor layer
/// before this handler runs.
pub async fn puzzmo_webhook(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    info!(body_length = body.len(), "webhook_received");

    // Acknowledgment is committed when this handler returns; the relay must
    // not delay it or influence its status.
    tokio::spawn(async move {
        relay_message(&state, &body).await;
    });

    (StatusCode::OK, "Webhook received")
}

/// Relay one acknowledged webhook body to Signal: parse, normalize, deliver.
///
/// Every terminal state is logged; none is retried. Runs strictly
/// sequentially, so per-request log ordering is deterministic.
pub async fn relay_message(state: &AppState, body: &[u8]) -> RelayOutcome {
    let content = match serde_json::from_slice::<DiscordPayload>(body) {
        Ok(payload) if !payload.content.is_empty() => payload.content,
        _ => {
            warn!("webhook_payload_invalid");
            return RelayOutcome::InvalidPayload;
        }
    };

    info!(content = %content, "webhook_message_received");

    let final_message = if state.preserve_markdown {
        content
    } else {
        match to_plain_text(&content) {
            Ok(plain) => plain,
            Err(e) => {
                error!(error = %e, "plaintext_extraction_failed");
                return RelayOutcome::NormalizeFailed;
            }
        }
    };

    match state.signal.send(&final_message).await {
        Ok(()) => {
            info!(message_length = final_message.len(), "signal_send_complete");
            RelayOutcome::Delivered
        }
        Err(e) => {
            error!(error = %e, "signal_send_failed");
            RelayOutcome::DeliveryFailed
        }
    }
}
