//! Error types for the session protocol.
//!
//! Handshake failures (peer never appeared, peer refused our key, peer never
//! sent its key) and decode failures (peer sent garbage) are separate
//! variants so callers can report them distinctly without inspecting
//! strings.

use std::time::Duration;

use duet_crypto::CryptoError;
use duet_proto::ProtocolError;
use thiserror::Error;

use crate::session::SessionState;

/// Outbound delivery failures reported by a [`crate::Transport`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Peer could not be reached at all (refused, unreachable, reset).
    #[error("connection failed: {0}")]
    Connection(String),

    /// Peer answered with a non-success status.
    #[error("peer rejected request with status {status}: {body}")]
    Rejected {
        /// Response status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// Any other failure (timeout after connecting, malformed response).
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Returns true for connection-level failures, the only kind retried
    /// during key delivery.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Errors surfaced by [`crate::PeerSession`] and [`crate::Inbound`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Key generation rejected the configured primes.
    #[error("{0}")]
    InvalidKeyParameters(CryptoError),

    /// Every key delivery attempt failed to connect.
    #[error("peer unreachable after {attempts} attempts: {reason}")]
    PeerUnreachable {
        /// Attempts made
        attempts: u32,
        /// Last connection error
        reason: String,
    },

    /// Key delivery failed for a reason other than connectivity.
    #[error("key delivery failed: {0}")]
    KeyDeliveryFailed(TransportError),

    /// Peer key did not arrive within the handshake timeout.
    #[error("handshake timeout after {elapsed:?}")]
    HandshakeTimeout {
        /// How long we waited
        elapsed: Duration,
    },

    /// A message arrived before the sender's public key.
    #[error("protocol ordering violation: message received before peer key")]
    ProtocolOrderingViolation,

    /// Inbound payload could not be parsed or decrypted.
    #[error("decode failure: {reason}")]
    DecodeFailure {
        /// What went wrong
        reason: String,
    },

    /// Outbound message attempted before the handshake completed.
    #[error("handshake incomplete: cannot send messages in state {state:?}")]
    HandshakeIncomplete {
        /// State at the time of the attempt
        state: SessionState,
    },

    /// Operation not valid in the current state.
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// Current state when error occurred
        state: SessionState,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// An outbound message could not be delivered.
    #[error("message delivery failed: {0}")]
    MessageDelivery(TransportError),
}

impl SessionError {
    /// Returns true if retrying the same operation may succeed.
    ///
    /// Only connection-level message delivery failures qualify. Handshake
    /// failures are terminal for the session and protocol violations
    /// indicate a broken peer.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::MessageDelivery(err) if err.is_connection())
    }

    /// Returns true if this error ended the handshake.
    pub fn is_handshake_failure(&self) -> bool {
        matches!(
            self,
            Self::PeerUnreachable { .. }
                | Self::KeyDeliveryFailed(_)
                | Self::HandshakeTimeout { .. }
        )
    }
}

impl From<ProtocolError> for SessionError {
    fn from(err: ProtocolError) -> Self {
        Self::DecodeFailure { reason: err.to_string() }
    }
}
