//! Node configuration and the two canonical peers.

use std::{path::PathBuf, time::Duration};

use duet_core::{DEFAULT_HANDSHAKE_TIMEOUT, RetryPolicy, SessionConfig};

use crate::http::DEFAULT_REQUEST_TIMEOUT;

/// Built-in peer identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// Alice: listens on 5000, talks to 5001, primes 61 and 53
    Alice,
    /// Bob: listens on 5001, talks to 5000, primes 67 and 71
    Bob,
}

/// Resolved node settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Our display name
    pub name: String,
    /// Peer's display name
    pub peer_name: String,
    /// Listener address (e.g., "0.0.0.0:5000")
    pub bind_address: String,
    /// Base URL of the peer's listener (e.g., `http://localhost:5001`)
    pub peer_url: String,
    /// First prime for key generation
    pub p: u64,
    /// Second prime for key generation
    pub q: u64,
    /// Transcript file, truncated at startup
    pub transcript_path: PathBuf,
    /// Key delivery retry policy
    pub retry: RetryPolicy,
    /// Bound on the wait for the peer's key
    pub handshake_timeout: Duration,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl NodeConfig {
    /// Settings for a built-in peer.
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Alice => Self::named("Alice", "Bob", 5000, 5001, (61, 53)),
            Preset::Bob => Self::named("Bob", "Alice", 5001, 5000, (67, 71)),
        }
    }

    fn named(name: &str, peer_name: &str, port: u16, peer_port: u16, (p, q): (u64, u64)) -> Self {
        Self {
            name: name.to_string(),
            peer_name: peer_name.to_string(),
            bind_address: format!("0.0.0.0:{port}"),
            peer_url: format!("http://localhost:{peer_port}"),
            p,
            q,
            transcript_path: default_transcript_path(name),
            retry: RetryPolicy::default(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Session settings derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            peer_name: self.peer_name.clone(),
            retry: self.retry,
            handshake_timeout: self.handshake_timeout,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::preset(Preset::Alice)
    }
}

/// `<name>_chat.log`, lowercased.
pub fn default_transcript_path(name: &str) -> PathBuf {
    PathBuf::from(format!("{}_chat.log", name.to_lowercase()))
}
