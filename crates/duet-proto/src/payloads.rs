//! Protocol payloads: key delivery, message delivery and their replies.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Public key delivery: `{ "e": <int>, "n": <int> }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPayload {
    /// Public exponent
    pub e: u64,
    /// Modulus
    pub n: u64,
}

impl KeyPayload {
    /// Serialize to JSON bytes.
    pub fn encode(&self) -> Vec<u8> {
        let Ok(bytes) = serde_json::to_vec(self) else {
            unreachable!("a struct of two integers always serializes");
        };
        bytes
    }

    /// Parse and validate a key delivery body.
    ///
    /// # Errors
    ///
    /// - `Malformed` if the body is not an object with integer `e` and `n`
    /// - `InvalidKey` if `n < 2` or `e == 0`
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let payload: Self =
            serde_json::from_slice(bytes).map_err(|e| ProtocolError::malformed("key", &e))?;
        payload.validate()?;
        Ok(payload)
    }

    /// Reject fields that cannot form a public key.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.n < 2 {
            return Err(ProtocolError::InvalidKey(format!("modulus {} is below 2", self.n)));
        }
        if self.e == 0 {
            return Err(ProtocolError::InvalidKey("exponent is zero".to_string()));
        }
        Ok(())
    }
}

/// Message delivery: a bare JSON array of ciphertext integers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessagePayload(pub Vec<u64>);

impl MessagePayload {
    /// Serialize to JSON bytes.
    pub fn encode(&self) -> Vec<u8> {
        let Ok(bytes) = serde_json::to_vec(self) else {
            unreachable!("a list of integers always serializes");
        };
        bytes
    }

    /// Parse a message delivery body.
    ///
    /// # Errors
    ///
    /// - `Malformed` if the body is not an array of non-negative integers
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::malformed("message", &e))
    }

    /// Ciphertext values in order.
    pub fn values(&self) -> &[u64] {
        &self.0
    }
}

impl From<Vec<u64>> for MessagePayload {
    fn from(values: Vec<u64>) -> Self {
        Self(values)
    }
}

/// Success acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Human-readable confirmation
    pub message: String,
}

impl Ack {
    /// Acknowledgement for an accepted key.
    pub fn key_received() -> Self {
        Self { message: "key received".to_string() }
    }

    /// Acknowledgement for a decrypted message.
    pub fn message_received() -> Self {
        Self { message: "message received".to_string() }
    }
}

/// Machine-readable failure category carried in [`ErrorReply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Payload could not be parsed or decrypted
    DecodeFailure,
    /// Message arrived before the sender's key
    ProtocolOrderingViolation,
    /// Request body missing a required field
    InvalidRequest,
}

/// Structured error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    /// Human-readable description
    pub error: String,
    /// Failure category
    pub kind: ErrorKind,
}

impl ErrorReply {
    /// Create an error body.
    pub fn new(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self { error: error.into(), kind }
    }
}
