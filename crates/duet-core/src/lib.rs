//! Duet peer session protocol.
//!
//! A session owns one textbook RSA key pair, delivers its public half to a
//! single peer, waits for the peer's public half and only then allows
//! outbound messages. Inbound deliveries are handled through a cloneable
//! [`Inbound`] handle that the listener side of the application owns.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────┐  key acked   ┌─────────┐  peer key   ┌───────────────────┐
//! │ Initializing │─────────────>│ KeySent │────────────>│ HandshakeComplete │
//! └──────────────┘              └─────────┘             └───────────────────┘
//!        │                           │
//!        │ unreachable / rejected    │ timeout
//!        ↓                           ↓
//!   ┌────────┐                  ┌────────┐
//!   │ Failed │                  │ Failed │
//!   └────────┘                  └────────┘
//! ```
//!
//! # Components
//!
//! - [`PeerSession`]: foreground side; drives the handshake and sends messages
//! - [`Inbound`]: listener side; accepts key and message deliveries
//! - [`PeerKeyState`]: the single value shared between the two sides
//! - [`Transport`]: outbound delivery, supplied by the application
//! - [`Environment`]: time and sleep, virtualised in tests
//! - [`Transcript`]: append-only audit trail, supplied by the application

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
mod error;
mod inbound;
mod peer_key;
mod session;
pub mod test_utils;
pub mod transcript;
mod transport;

pub use env::Environment;
pub use error::{SessionError, TransportError};
pub use inbound::Inbound;
pub use peer_key::PeerKeyState;
pub use session::{
    DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, PeerSession, RetryPolicy,
    SessionConfig, SessionState,
};
pub use transcript::{Direction, NullTranscript, Transcript, TranscriptEntry};
pub use transport::Transport;
