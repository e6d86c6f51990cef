//! puzzmo2signal - Puzzmo webhook to Signal group relay.
//!
//! A single-purpose glue server: Puzzmo posts Discord-compatible webhooks to
//! an unguessable secret path, and each payload's `content` is forwarded to
//! a Signal group through the signal-cli REST API, with Markdown stripped by
//! default.
//!
//! ## Architecture
//!
//! ```text
//! Puzzmo → Tunnel (HTTPS) → Webhook handler → Plaintext extractor → Signal API
//! ```
//!
//! Public reachability comes from an external tunnel (Tailscale Funnel); this
//! process only binds a local listener and announces the public URL.

pub mod config;
pub mod plaintext;
pub mod secret;
pub mod signal;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use plaintext::to_plain_text;
pub use secret::SecretPathStore;
pub use signal::{SendError, SignalClient};
pub use web::{build_router, AppState, RelayOutcome};
