//! Duet wire protocol.
//!
//! JSON bodies exchanged between two peers. Framing (HTTP request/response,
//! routes, status codes) belongs to the transport; this crate only fixes the
//! shape of each body and how it is decoded.
//!
//! # Operations
//!
//! Every peer exposes two inbound operations and invokes the same two on its
//! counterpart:
//!
//! ```text
//! receive-key      { "e": 19, "n": 3233 }          -> Ack | ErrorReply
//! receive-message  [1270, 755, 666, 666, 128]      -> Ack | ErrorReply
//! ```
//!
//! The [`demo`] module holds the bodies of the standalone encrypt/decrypt and
//! webhook endpoints, which carry no protocol state.
//!
//! # Invariants
//!
//! Decoding never panics. Any byte string either decodes to a well-formed
//! payload or yields a [`ProtocolError`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod demo;
mod error;
mod payloads;

pub use error::ProtocolError;
pub use payloads::{Ack, ErrorKind, ErrorReply, KeyPayload, MessagePayload};
