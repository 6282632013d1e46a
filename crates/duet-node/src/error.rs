//! Node error types.

use duet_core::SessionError;
use thiserror::Error;

/// Errors that can stop a node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Invalid configuration (bad primes, unusable peer URL).
    ///
    /// Fatal at startup. Fix the flags and restart.
    #[error("configuration error: {0}")]
    Config(String),

    /// Session failure (handshake failed, key parameters rejected).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Listener or transcript I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
