//! Fuzz target for inbound key and message handling
//!
//! Drives a session's listener side with an arbitrary interleaving of valid
//! keys, garbage keys, valid messages and garbage messages.
//!
//! # Invariants
//!
//! - Messages before any accepted key are refused, never decrypted
//! - Rejected keys never change the stored peer key
//! - The stored peer key is always the last accepted one
//! - Messages encrypted under our public key always decrypt back
//! - NEVER panic on malformed input

#![no_main]

use arbitrary::Arbitrary;
use duet_core::{
    PeerSession, SessionConfig, SessionError,
    test_utils::{MockEnv, MockTransport},
};
use duet_crypto::{PublicKey, encrypt};
use duet_proto::{KeyPayload, MessagePayload};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    ValidKey { e: u16, n: u16 },
    RawKey(Vec<u8>),
    Message(String),
    RawMessage(Vec<u8>),
}

fuzz_target!(|ops: Vec<Op>| {
    let Ok(session) = PeerSession::generate(
        MockEnv::new(),
        MockTransport::new(),
        61,
        53,
        SessionConfig::default(),
    ) else {
        return;
    };
    let inbound = session.inbound();
    let own_key = session.public_key();
    let mut expected: Option<PublicKey> = None;

    for op in ops.into_iter().take(64) {
        match op {
            Op::ValidKey { e, n } => {
                let payload = KeyPayload { e: u64::from(e).max(1), n: u64::from(n).max(2) };
                let key = inbound.receive_key(&payload.encode()).unwrap();
                expected = Some(key);
            },
            Op::RawKey(bytes) => match inbound.receive_key(&bytes) {
                Ok(key) => expected = Some(key),
                Err(err) => assert!(matches!(err, SessionError::DecodeFailure { .. })),
            },
            Op::Message(text) => {
                let ascii: String = text.chars().filter(char::is_ascii).collect();
                let body = MessagePayload::from(encrypt(&own_key, &ascii).into_inner()).encode();
                match (expected, inbound.receive_message(&body)) {
                    (None, result) => {
                        assert_eq!(result, Err(SessionError::ProtocolOrderingViolation));
                    },
                    (Some(_), result) => assert_eq!(result, Ok(ascii)),
                }
            },
            Op::RawMessage(bytes) => {
                let result = inbound.receive_message(&bytes);
                if expected.is_none() {
                    assert_eq!(result, Err(SessionError::ProtocolOrderingViolation));
                }
            },
        }

        assert_eq!(inbound.peer_key(), expected);
    }
});
