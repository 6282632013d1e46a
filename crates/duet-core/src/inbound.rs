//! Listener side of a peer session.

use std::sync::Arc;

use duet_crypto::{KeyPair, PublicKey, decrypt};
use duet_proto::{KeyPayload, MessagePayload};

use crate::{
    error::SessionError,
    peer_key::PeerKeyState,
    transcript::{Direction, Transcript, TranscriptEntry},
};

/// Handles the peer's two inbound operations.
///
/// Cheap to clone; every clone feeds the same session. Handlers may run
/// concurrently with each other and with the foreground flow.
#[derive(Clone)]
pub struct Inbound {
    keypair: Arc<KeyPair>,
    peer_key: PeerKeyState,
    transcript: Arc<dyn Transcript>,
    peer_name: String,
}

impl Inbound {
    pub(crate) fn new(
        keypair: Arc<KeyPair>,
        peer_key: PeerKeyState,
        transcript: Arc<dyn Transcript>,
        peer_name: String,
    ) -> Self {
        Self { keypair, peer_key, transcript, peer_name }
    }

    /// Parse and store the peer's public key from a raw request body.
    ///
    /// A later key replaces an earlier one.
    ///
    /// # Errors
    ///
    /// - `DecodeFailure` if the body is not a valid key payload; the stored
    ///   key is left untouched
    pub fn receive_key(&self, body: &[u8]) -> Result<PublicKey, SessionError> {
        match KeyPayload::decode(body) {
            Ok(payload) => Ok(self.accept_key(payload)),
            Err(err) => {
                tracing::warn!(peer = %self.peer_name, error = %err, "rejected peer key");
                self.transcript.record(
                    TranscriptEntry::system(format!("Error receiving key from {}.", self.peer_name))
                        .with_detail(err.to_string()),
                );
                Err(err.into())
            },
        }
    }

    /// Store an already-validated key payload.
    pub fn accept_key(&self, payload: KeyPayload) -> PublicKey {
        let key = PublicKey::new(payload.e, payload.n);
        let previous = self.peer_key.set(key);

        if previous.is_some_and(|old| old != key) {
            tracing::info!(peer = %self.peer_name, %key, "peer public key replaced");
        } else {
            tracing::info!(peer = %self.peer_name, %key, "peer public key received");
        }
        self.transcript.record(
            TranscriptEntry::system(format!("Public key received from {}.", self.peer_name))
                .with_detail(key.to_string()),
        );
        key
    }

    /// Decrypt a ciphertext from a raw request body with our private key.
    ///
    /// # Errors
    ///
    /// - `ProtocolOrderingViolation` if no peer key has been received yet
    /// - `DecodeFailure` if the body is malformed or does not decrypt to
    ///   valid text
    pub fn receive_message(&self, body: &[u8]) -> Result<String, SessionError> {
        if !self.peer_key.is_ready() {
            tracing::warn!(peer = %self.peer_name, "message received before peer key");
            self.transcript.record(TranscriptEntry::system(format!(
                "Message from {} ignored: public key not received yet.",
                self.peer_name
            )));
            return Err(SessionError::ProtocolOrderingViolation);
        }

        let (plaintext, payload) = match self.decrypt_body(body) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::warn!(peer = %self.peer_name, error = %err, "undecodable message");
                self.transcript.record(
                    TranscriptEntry::system(format!(
                        "Error decrypting message from {}.",
                        self.peer_name
                    ))
                    .with_detail(err.to_string()),
                );
                return Err(err);
            },
        };

        tracing::debug!(
            peer = %self.peer_name,
            chars = payload.values().len(),
            "message decrypted"
        );
        self.transcript.record(
            TranscriptEntry::new(Direction::Received, plaintext.as_str())
                .with_detail(format!("{:?}", payload.values())),
        );
        Ok(plaintext)
    }

    fn decrypt_body(&self, body: &[u8]) -> Result<(String, MessagePayload), SessionError> {
        let payload = MessagePayload::decode(body)?;
        let plaintext = decrypt(self.keypair.private(), payload.values())
            .map_err(|err| SessionError::DecodeFailure { reason: err.to_string() })?;
        Ok((plaintext, payload))
    }

    /// Our key pair, for operations that encrypt or decrypt outside the
    /// session flow.
    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    /// Peer's most recently received key.
    pub fn peer_key(&self) -> Option<PublicKey> {
        self.peer_key.current()
    }

    /// Peer's display name.
    pub fn peer_name(&self) -> &str {
        &self.peer_name
    }
}

impl std::fmt::Debug for Inbound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inbound")
            .field("public_key", self.keypair.public())
            .field("peer_key", &self.peer_key.current())
            .field("peer_name", &self.peer_name)
            .finish_non_exhaustive()
    }
}
