//! Outbound delivery abstraction.

use std::future::Future;

use duet_proto::{KeyPayload, MessagePayload};

use crate::error::TransportError;

/// Delivers payloads to the peer's two inbound operations.
///
/// The session never frames or addresses anything itself; the implementation
/// decides how a payload reaches the peer (HTTP in the node, a direct call in
/// tests). `Ok(())` means the peer acknowledged receipt.
///
/// # Errors
///
/// Implementations MUST report "could not connect" as
/// [`TransportError::Connection`]: it is the only failure the key delivery
/// retries.
pub trait Transport: Send + Sync + 'static {
    /// Deliver our public key to the peer's receive-key operation.
    fn send_key(
        &self,
        key: &KeyPayload,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Deliver a ciphertext to the peer's receive-message operation.
    fn send_message(
        &self,
        message: &MessagePayload,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
