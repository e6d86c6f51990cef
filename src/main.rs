//! puzzmo2signal server binary.
//!
//! Startup order matters: configuration and the secret path must both be in
//! hand before the listener opens, so the process either serves the stable
//! webhook URL or exits. The announced URL is the tunnel hostname plus the
//! secret path; TLS termination happens in the tunnel, not here.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use puzzmo2signal::{build_router, AppState, Config, SecretPathStore, SignalClient};

#[derive(Parser, Debug)]
#[command(name = "puzzmo2signal", about = "Relay Puzzmo webhooks to a Signal group")]
struct Cli {
    /// Forward message content verbatim instead of stripping Markdown
    #[arg(long)]
    preserve_markdown: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("server_starting");

    let cli = Cli::parse();

    // Load configuration; any missing required variable is fatal
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        port = config.port,
        ts_hostname = %config.ts_hostname,
        preserve_markdown = cli.preserve_markdown,
        "config_loaded"
    );

    // Get or create the secret webhook path before serving anything
    let webhook_path = SecretPathStore::default_location()?
        .load_or_create()
        .context("Failed to set up webhook path")?;

    let signal_client = SignalClient::new(&config);
    let state = AppState::new(signal_client, cli.preserve_markdown);
    let app = build_router(&webhook_path, state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "server_listening");
    info!(
        url = %format!("https://{}/{}", config.ts_hostname, webhook_path),
        "webhook_url"
    );

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("server_shutting_down");
}
