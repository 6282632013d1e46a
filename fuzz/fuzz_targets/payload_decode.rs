//! Fuzz target for wire payload decoding
//!
//! # Invariants
//!
//! - Decoding arbitrary bytes never panics
//! - A decoded key always has n >= 2 and e >= 1
//! - Anything that decodes re-encodes to bytes that decode to the same value

#![no_main]

use duet_proto::{KeyPayload, MessagePayload};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(key) = KeyPayload::decode(data) {
        assert!(key.n >= 2 && key.e >= 1, "invalid key accepted: {key:?}");
        assert_eq!(KeyPayload::decode(&key.encode()).ok(), Some(key));
    }

    if let Ok(message) = MessagePayload::decode(data) {
        let reencoded = message.encode();
        assert_eq!(MessagePayload::decode(&reencoded).ok(), Some(message));
    }
});
