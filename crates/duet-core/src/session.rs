//! Foreground side of a peer session.
//!
//! [`PeerSession::establish`] runs the whole handshake: deliver our public
//! key (retrying while the peer is unreachable), then wait a bounded time for
//! the peer's key. Once it succeeds, [`PeerSession::send_message`] encrypts
//! under the peer's current key and hands the ciphertext to the transport.
//!
//! The listener side talks to the same session through [`Inbound`], obtained
//! from [`PeerSession::inbound`].

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use duet_crypto::{Ciphertext, KeyPair, PublicKey, encrypt};
use duet_proto::{KeyPayload, MessagePayload};
use tokio::sync::watch;

use crate::{
    env::Environment,
    error::SessionError,
    inbound::Inbound,
    peer_key::PeerKeyState,
    transcript::{Direction, NullTranscript, Transcript, TranscriptEntry},
    transport::Transport,
};

/// Key delivery attempts before giving up on the peer.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Pause between key delivery attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Time allowed for the peer's key to arrive once ours was delivered.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Key pair generated, nothing sent yet
    Initializing,
    /// Our key was acknowledged; waiting for the peer's key
    KeySent,
    /// Both keys exchanged; messages may be sent
    HandshakeComplete,
    /// Handshake failed; the session will not act again
    Failed,
}

impl SessionState {
    /// True for states the session never leaves.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::HandshakeComplete | Self::Failed)
    }
}

/// Bounded retry for key delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Pause between consecutive attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, delay: DEFAULT_RETRY_DELAY }
    }
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Peer's display name, used in logs and the transcript
    pub peer_name: String,
    /// Key delivery retry policy
    pub retry: RetryPolicy,
    /// Bound on the wait for the peer's key
    pub handshake_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            peer_name: "peer".to_string(),
            retry: RetryPolicy::default(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

/// One end of an encrypted conversation with a single peer.
///
/// Owns the local key pair and the peer key state. Shared with the listener
/// flow only through [`Inbound`] handles.
pub struct PeerSession<E: Environment, T: Transport> {
    env: E,
    transport: T,
    config: SessionConfig,
    keypair: Arc<KeyPair>,
    peer_key: PeerKeyState,
    state: watch::Sender<SessionState>,
    started: AtomicBool,
    transcript: Arc<dyn Transcript>,
}

impl<E: Environment, T: Transport> PeerSession<E, T> {
    /// Create a session around an existing key pair.
    pub fn new(env: E, transport: T, keypair: KeyPair, config: SessionConfig) -> Self {
        let (state, _rx) = watch::channel(SessionState::Initializing);
        Self {
            env,
            transport,
            config,
            keypair: Arc::new(keypair),
            peer_key: PeerKeyState::new(),
            state,
            started: AtomicBool::new(false),
            transcript: Arc::new(NullTranscript),
        }
    }

    /// Generate a key pair from `p` and `q` and create a session around it.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyParameters` if the primes are rejected
    pub fn generate(
        env: E,
        transport: T,
        p: u64,
        q: u64,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let keypair = KeyPair::generate(p, q).map_err(SessionError::InvalidKeyParameters)?;
        Ok(Self::new(env, transport, keypair, config))
    }

    /// Record events to `transcript` instead of discarding them.
    #[must_use]
    pub fn with_transcript(mut self, transcript: Arc<dyn Transcript>) -> Self {
        self.transcript = transcript;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Our public key.
    pub fn public_key(&self) -> PublicKey {
        *self.keypair.public()
    }

    /// Peer's most recently received public key.
    pub fn peer_key(&self) -> Option<PublicKey> {
        self.peer_key.current()
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Handle for the listener flow.
    pub fn inbound(&self) -> Inbound {
        Inbound::new(
            Arc::clone(&self.keypair),
            self.peer_key.clone(),
            Arc::clone(&self.transcript),
            self.config.peer_name.clone(),
        )
    }

    /// Run the handshake to completion.
    ///
    /// Returns the peer's public key on success. The session ends in
    /// `HandshakeComplete` or `Failed` and never changes state again.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the handshake was already started
    /// - `PeerUnreachable` if every delivery attempt failed to connect
    /// - `KeyDeliveryFailed` if delivery failed for any other reason
    /// - `HandshakeTimeout` if the peer's key did not arrive in time
    pub async fn establish(&self) -> Result<PublicKey, SessionError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(SessionError::InvalidState {
                state: self.state(),
                operation: "establish",
            });
        }

        match self.run_handshake().await {
            Ok(peer_key) => {
                self.transition(SessionState::HandshakeComplete);
                tracing::info!(peer = %self.config.peer_name, %peer_key, "handshake complete");
                self.record(TranscriptEntry::system(format!(
                    "Communication established with {}.",
                    self.config.peer_name
                )));
                Ok(peer_key)
            },
            Err(err) => {
                self.transition(SessionState::Failed);
                tracing::error!(peer = %self.config.peer_name, error = %err, "handshake failed");
                self.record(TranscriptEntry::system(format!(
                    "Handshake with {} failed: {err}",
                    self.config.peer_name
                )));
                Err(err)
            },
        }
    }

    /// Encrypt `text` under the peer's current key and deliver it.
    ///
    /// Returns the ciphertext that was sent. Failures leave the session
    /// usable for the next message.
    ///
    /// # Errors
    ///
    /// - `HandshakeIncomplete` before the handshake completed
    /// - `MessageDelivery` if the transport failed
    pub async fn send_message(&self, text: &str) -> Result<Ciphertext, SessionError> {
        let state = self.state();
        if state != SessionState::HandshakeComplete {
            return Err(SessionError::HandshakeIncomplete { state });
        }
        let Some(peer_key) = self.peer_key.current() else {
            return Err(SessionError::HandshakeIncomplete { state });
        };

        let ciphertext = encrypt(&peer_key, text);
        let payload = MessagePayload(ciphertext.as_slice().to_vec());

        match self.transport.send_message(&payload).await {
            Ok(()) => {
                tracing::debug!(chars = ciphertext.len(), "message delivered");
                self.record(
                    TranscriptEntry::new(Direction::Sent, text)
                        .with_detail(format!("{:?}", ciphertext.as_slice())),
                );
                Ok(ciphertext)
            },
            Err(err) => {
                tracing::warn!(
                    peer = %self.config.peer_name,
                    error = %err,
                    "message delivery failed"
                );
                self.record(
                    TranscriptEntry::system(format!(
                        "Failed to send to {}: {text}",
                        self.config.peer_name
                    ))
                    .with_detail(err.to_string()),
                );
                Err(SessionError::MessageDelivery(err))
            },
        }
    }

    async fn run_handshake(&self) -> Result<PublicKey, SessionError> {
        self.deliver_local_key().await?;
        self.transition(SessionState::KeySent);
        self.await_peer_key().await
    }

    /// Deliver our key, retrying connection failures per the retry policy.
    async fn deliver_local_key(&self) -> Result<(), SessionError> {
        let public = self.keypair.public();
        let payload = KeyPayload { e: public.e, n: public.n };
        let policy = self.config.retry;
        let max_attempts = policy.attempts();
        let peer = &self.config.peer_name;

        let mut last_error = String::new();
        for attempt in 1..=max_attempts {
            tracing::info!(%peer, attempt, max_attempts, "sending public key");

            match self.transport.send_key(&payload).await {
                Ok(()) => {
                    tracing::info!(%peer, "public key delivered");
                    self.record(
                        TranscriptEntry::system(format!("Public key sent to {peer}."))
                            .with_detail(format!("e={}, n={}", payload.e, payload.n)),
                    );
                    return Ok(());
                },
                Err(err) if err.is_connection() => {
                    tracing::warn!(
                        %peer,
                        attempt,
                        max_attempts,
                        error = %err,
                        "peer unreachable, retrying in {:?}",
                        policy.delay
                    );
                    last_error = err.to_string();
                    if attempt < max_attempts {
                        self.env.sleep(policy.delay).await;
                    }
                },
                Err(err) => {
                    self.record(
                        TranscriptEntry::system(format!("Error sending key to {peer}."))
                            .with_detail(err.to_string()),
                    );
                    return Err(SessionError::KeyDeliveryFailed(err));
                },
            }
        }

        self.record(TranscriptEntry::system(format!(
            "Could not connect to {peer} to send key after {max_attempts} attempts."
        )));
        Err(SessionError::PeerUnreachable { attempts: max_attempts, reason: last_error })
    }

    async fn await_peer_key(&self) -> Result<PublicKey, SessionError> {
        tracing::info!(
            peer = %self.config.peer_name,
            timeout = ?self.config.handshake_timeout,
            "waiting for peer public key"
        );

        let started = self.env.now();
        match self.peer_key.wait(self.config.handshake_timeout).await {
            Some(key) => Ok(key),
            None => Err(SessionError::HandshakeTimeout { elapsed: self.env.now() - started }),
        }
    }

    /// Apply a transition unless the session already reached a terminal
    /// state.
    fn transition(&self, next: SessionState) {
        self.state.send_if_modified(|state| {
            if state.is_terminal() || *state == next {
                return false;
            }
            tracing::debug!(from = ?*state, to = ?next, "session state transition");
            *state = next;
            true
        });
    }

    fn record(&self, entry: TranscriptEntry) {
        self.transcript.record(entry);
    }
}
