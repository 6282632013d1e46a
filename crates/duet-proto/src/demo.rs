//! Bodies of the demonstration endpoints.
//!
//! These endpoints expose the cipher directly (encrypt under the node's own
//! public key, decrypt with its own private key) and accept free-form
//! notifications from external systems. They are independent of the peer
//! handshake.

use serde::{Deserialize, Serialize};

use crate::payloads::KeyPayload;

/// `POST /encrypt` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptRequest {
    /// Text to encrypt; absent or empty is rejected
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /encrypt` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptReply {
    /// One ciphertext integer per character
    pub encrypted: Vec<u64>,
    /// Key the text was encrypted under
    pub public_key: KeyPayload,
}

/// `POST /decrypt` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptRequest {
    /// Ciphertext produced under the node's public key
    #[serde(default)]
    pub ciphertext: Option<Vec<u64>>,
}

/// `POST /decrypt` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptReply {
    /// Recovered text
    pub decrypted: String,
}

/// `POST /webhook` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookRequest {
    /// Notification text; defaults to empty
    #[serde(default)]
    pub message: String,
}

/// `POST /webhook` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookReply {
    /// Always `"received"`
    pub status: String,
}

impl WebhookReply {
    /// The only reply the webhook gives.
    pub fn received() -> Self {
        Self { status: "received".to_string() }
    }
}

/// `GET /` response describing the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Status line
    pub message: String,
    /// Routes served
    pub endpoints: Vec<String>,
}
