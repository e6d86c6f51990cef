//! Outbound message delivery to the signal-cli REST API.
//!
//! One attempt per message, no retries, no backoff. A non-200 response is a
//! delivery failure; the response body is captured so the log line carries
//! the API's own diagnostics.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::Config;

/// Delivery failure for a single send attempt.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("signal api request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("signal api returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Request body for `POST /v2/send`.
#[derive(Debug, Serialize)]
struct SendPayload<'a> {
    number: &'a str,
    message: &'a str,
    recipients: [&'a str; 1],
}

/// Client for the signal-cli REST API's send endpoint.
///
/// Cheap to clone: the underlying reqwest client is shared. Sender identity
/// and destination group are fixed at construction.
#[derive(Clone)]
pub struct SignalClient {
    client: Client,
    number: String,
    group_id: String,
    send_url: String,
}

impl SignalClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            number: config.signal_phone.clone(),
            group_id: config.signal_group_id.clone(),
            send_url: format!("{}/v2/send", ensure_scheme(&config.signal_api_url)),
        }
    }

    /// Send a message to the configured group. Single attempt.
    pub async fn send(&self, message: &str) -> Result<(), SendError> {
        let payload = SendPayload {
            number: &self.number,
            message,
            recipients: [&self.group_id],
        };

        info!(
            url = %self.send_url,
            message_length = message.len(),
            "signal_send_starting"
        );

        let response = self
            .client
            .post(&self.send_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Default to plain http when the configured API URL has no scheme.
///
/// signal-cli-rest-api deployments are commonly addressed as bare host:port
/// on a private network. Note: an unqualified URL therefore gets an
/// unencrypted transport.
fn ensure_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(api_url: &str) -> Config {
        Config {
            ts_hostname: "puzzmo-webhook".to_string(),
            ts_authkey: "tskey-test".to_string(),
            signal_phone: "+15550100".to_string(),
            signal_group_id: "group.abc123".to_string(),
            signal_api_url: api_url.to_string(),
            port: 8080,
        }
    }

    #[test]
    fn test_ensure_scheme_bare_host() {
        assert_eq!(ensure_scheme("localhost:8080"), "http://localhost:8080");
    }

    #[test]
    fn test_ensure_scheme_preserves_explicit_schemes() {
        assert_eq!(ensure_scheme("http://host:1"), "http://host:1");
        assert_eq!(ensure_scheme("https://host"), "https://host");
    }

    #[tokio::test]
    async fn test_send_posts_expected_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .and(body_json(serde_json::json!({
                "number": "+15550100",
                "message": "hello world",
                "recipients": ["group.abc123"],
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = SignalClient::new(&test_config(&server.uri()));

        client.send("hello world").await.unwrap();
    }

    #[tokio::test]
    async fn test_send_non_200_is_a_failure_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid number"))
            .mount(&server)
            .await;

        let client = SignalClient::new(&test_config(&server.uri()));
        let err = client.send("hello").await.unwrap_err();

        match err {
            SendError::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "invalid number");
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_transport_failure() {
        // Nothing is listening on this port
        let client = SignalClient::new(&test_config("http://127.0.0.1:1"));
        let err = client.send("hello").await.unwrap_err();

        assert!(matches!(err, SendError::Http(_)));
    }
}
