//! Decoding errors.

use thiserror::Error;

/// Errors raised while decoding a wire payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Body is not valid JSON of the expected shape (missing fields,
    /// non-integer values, wrong container type).
    #[error("malformed {payload} payload: {reason}")]
    Malformed {
        /// Payload that was being decoded
        payload: &'static str,
        /// Decoder message
        reason: String,
    },

    /// Key fields parsed but cannot describe a usable public key.
    #[error("invalid public key: {0}")]
    InvalidKey(String),
}

impl ProtocolError {
    pub(crate) fn malformed(payload: &'static str, err: &serde_json::Error) -> Self {
        Self::Malformed { payload, reason: err.to_string() }
    }
}
