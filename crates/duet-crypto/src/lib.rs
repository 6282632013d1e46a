//! Duet Cryptographic Primitives
//!
//! Textbook RSA over small primes: number theory helpers, key pair derivation
//! and a per-character codec. Pure functions with deterministic outputs; no
//! randomness is involved anywhere in this crate.
//!
//! # Key Lifecycle
//!
//! ```text
//! primes (p, q)
//!        │
//!        ▼
//! n = p·q, φ = (p−1)(q−1)
//!        │
//!        ▼
//! e: 65537 adjusted until gcd(e, φ) = 1 and e < φ
//!        │
//!        ▼
//! d = e⁻¹ mod φ
//!        │
//!        ▼
//! KeyPair { public: (e, n), private: (d, n) }
//! ```
//!
//! Encryption maps every character of a message to its Unicode code point and
//! raises it to `e` modulo `n`, producing one integer per character. Decryption
//! raises each integer to `d` modulo `n` and maps the result back.
//!
//! # Security
//!
//! None. There is no padding, no randomisation and the moduli are trivially
//! factorable. Identical characters encrypt to identical integers. The scheme
//! exists to demonstrate the handshake protocol built on top of it and must
//! not be used to protect real data.
//!
//! The private exponent is zeroized when its [`PrivateKey`] is dropped.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
mod error;
pub mod keypair;
pub mod number_theory;

pub use codec::{Ciphertext, decrypt, encrypt};
pub use error::CryptoError;
pub use keypair::{DEFAULT_PUBLIC_EXPONENT, KeyPair, PrivateKey, PublicKey, generate_keypair};
