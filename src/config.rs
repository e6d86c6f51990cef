//! Configuration module for environment variable parsing.
//!
//! All configuration comes from environment variables, read once at startup
//! into an immutable struct. Missing required variables abort startup.

use std::env;

use anyhow::{bail, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tunnel hostname, used to announce the public webhook URL
    pub ts_hostname: String,

    /// Tunnel auth key, consumed by the external tunnel sidecar
    pub ts_authkey: String,

    /// Sender phone number registered with signal-cli
    pub signal_phone: String,

    /// Destination Signal group identifier
    pub signal_group_id: String,

    /// Base URL of the signal-cli REST API
    pub signal_api_url: String,

    /// Port for the local listener the tunnel forwards to
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every field except `PORT` is required; the error names the first
    /// variable found missing.
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            ts_hostname: require_env("TS_HOSTNAME")?,
            ts_authkey: require_env("TS_AUTHKEY")?,
            signal_phone: require_env("SIGNAL_PHONE")?,
            signal_group_id: require_env("SIGNAL_GROUP_ID")?,
            signal_api_url: require_env("SIGNAL_API_URL")?,

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }
}

/// Read a required environment variable, rejecting empty values.
fn require_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{} environment variable is required", name),
    }
}
