//! HTTP transport to the peer node.

use std::time::Duration;

use duet_core::{Transport, TransportError};
use duet_proto::{KeyPayload, MessagePayload};
use reqwest::header::CONTENT_TYPE;

use crate::error::NodeError;

/// Per-request timeout used unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts payloads as JSON to `{peer_url}/key` and `{peer_url}/msg`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    key_url: String,
    msg_url: String,
}

impl HttpTransport {
    /// Create a transport for the peer at `peer_url`.
    ///
    /// # Errors
    ///
    /// - `Config` if the HTTP client cannot be built
    pub fn new(peer_url: &str, request_timeout: Duration) -> Result<Self, NodeError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| NodeError::Config(format!("HTTP client: {e}")))?;

        let base = peer_url.trim_end_matches('/');
        Ok(Self { client, key_url: format!("{base}/key"), msg_url: format!("{base}/msg") })
    }

    async fn post(&self, url: &str, body: Vec<u8>) -> Result<(), TransportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Rejected { status: status.as_u16(), body })
    }
}

/// Only failures to connect are retryable.
fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

impl Transport for HttpTransport {
    async fn send_key(&self, key: &KeyPayload) -> Result<(), TransportError> {
        self.post(&self.key_url, key.encode()).await
    }

    async fn send_message(&self, message: &MessagePayload) -> Result<(), TransportError> {
        self.post(&self.msg_url, message.encode()).await
    }
}
