//! Per-character encryption and decryption.
//!
//! Every character is encrypted independently: `c = m^e mod n` where `m` is
//! the character's Unicode code point. The ciphertext therefore has exactly
//! one integer per character, in order.
//!
//! Code points `>= n` are reduced modulo `n` before exponentiation and cannot
//! be recovered. With the small demo moduli (`n` in the low thousands) this
//! covers everything outside ASCII and Latin-1; the limitation is inherent to
//! the scheme and is not handled specially.

use crate::{
    error::CryptoError,
    keypair::{PrivateKey, PublicKey},
    number_theory::mod_pow,
};

/// Ordered sequence of encrypted character codes.
///
/// Every element lies in `[0, n)` for the modulus of the encrypting key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Ciphertext(Vec<u64>);

impl Ciphertext {
    /// Encrypted values, one per source character.
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// Number of encrypted characters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the source text was empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take ownership of the encrypted values.
    pub fn into_inner(self) -> Vec<u64> {
        self.0
    }
}

impl FromIterator<u64> for Ciphertext {
    fn from_iter<T: IntoIterator<Item = u64>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Encrypt `plaintext` under `key`, one integer per character.
///
/// Deterministic: the same text and key always produce the same sequence.
pub fn encrypt(key: &PublicKey, plaintext: &str) -> Ciphertext {
    plaintext.chars().map(|ch| mod_pow(u64::from(u32::from(ch)), key.e, key.n)).collect()
}

/// Decrypt an integer sequence produced by [`encrypt`] with the matching
/// public key.
///
/// # Errors
///
/// - `CiphertextOutOfRange` if a value is not below the key's modulus
/// - `InvalidCodePoint` if a decrypted value is not a Unicode scalar value
pub fn decrypt(key: &PrivateKey, ciphertext: &[u64]) -> Result<String, CryptoError> {
    let n = key.modulus();

    ciphertext
        .iter()
        .map(|&value| {
            if value >= n {
                return Err(CryptoError::CiphertextOutOfRange { value, modulus: n });
            }

            let code = mod_pow(value, key.exponent(), n);
            u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or(CryptoError::InvalidCodePoint(code))
        })
        .collect()
}
