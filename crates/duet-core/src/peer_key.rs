//! The peer's public key, shared between listener and foreground flows.

use std::{sync::Arc, time::Duration};

use duet_crypto::PublicKey;
use tokio::sync::watch;

/// Holder for the peer's public key.
///
/// Starts unset and becomes set on the first accepted key. Later keys
/// overwrite the stored one (last write wins) but the state never returns to
/// unset. Every read and write goes through this type, so readers always see
/// a whole key, never a mix of two deliveries.
///
/// Clones share the same underlying value.
#[derive(Debug, Clone)]
pub struct PeerKeyState {
    tx: Arc<watch::Sender<Option<PublicKey>>>,
}

impl PeerKeyState {
    /// Create an unset state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Store `key` and wake every waiter. Returns the key it replaced.
    pub fn set(&self, key: PublicKey) -> Option<PublicKey> {
        self.tx.send_replace(Some(key))
    }

    /// Most recently stored key.
    pub fn current(&self) -> Option<PublicKey> {
        *self.tx.borrow()
    }

    /// True once any key has been stored.
    pub fn is_ready(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Wait up to `timeout` for a key to be stored.
    ///
    /// Returns immediately if a key is already present. `None` means the
    /// timeout elapsed.
    pub async fn wait(&self, timeout: Duration) -> Option<PublicKey> {
        let mut rx = self.tx.subscribe();
        match tokio::time::timeout(timeout, rx.wait_for(Option::is_some)).await {
            Ok(Ok(key)) => *key,
            // Sender lives in `self`; it cannot close while we wait on it
            Ok(Err(_)) | Err(_) => None,
        }
    }
}

impl Default for PeerKeyState {
    fn default() -> Self {
        Self::new()
    }
}
