//! Error types for key generation and the cipher codec.

use thiserror::Error;

/// Errors produced by the textbook RSA primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A key generation input failed the primality test.
    #[error("invalid key parameters: {0} is not prime")]
    NotPrime(u64),

    /// Both key generation inputs were the same prime.
    #[error("invalid key parameters: p and q must differ (both are {0})")]
    EqualPrimes(u64),

    /// The totient admits no public exponent with `1 < e < φ`.
    #[error("invalid key parameters: totient {phi} leaves no usable public exponent")]
    DegenerateTotient {
        /// The offending totient
        phi: u64,
    },

    /// `p · q` does not fit in 64 bits.
    #[error("invalid key parameters: {p} * {q} overflows the modulus")]
    ModulusOverflow {
        /// First prime
        p: u64,
        /// Second prime
        q: u64,
    },

    /// `e` has no multiplicative inverse modulo `phi`.
    #[error("{e} has no inverse modulo {phi}")]
    NoModularInverse {
        /// Value to invert
        e: u64,
        /// Modulus
        phi: u64,
    },

    /// A ciphertext integer is not a residue of the key's modulus.
    #[error("ciphertext value {value} is outside [0, {modulus})")]
    CiphertextOutOfRange {
        /// Offending ciphertext value
        value: u64,
        /// Modulus of the decrypting key
        modulus: u64,
    },

    /// A decrypted value does not map to a Unicode scalar value.
    #[error("decrypted value {0} is not a valid character code")]
    InvalidCodePoint(u64),
}

impl CryptoError {
    /// Returns true if this error rejects the `(p, q)` inputs of key
    /// generation.
    pub fn is_key_parameter_error(&self) -> bool {
        matches!(
            self,
            Self::NotPrime(_)
                | Self::EqualPrimes(_)
                | Self::DegenerateTotient { .. }
                | Self::ModulusOverflow { .. }
        )
    }
}
