//! Key pair derivation from two primes.

use std::fmt;

use zeroize::Zeroize;

use crate::{
    error::CryptoError,
    number_theory::{gcd, is_prime, mod_inverse},
};

/// Starting point for the public exponent search.
pub const DEFAULT_PUBLIC_EXPONENT: u64 = 65_537;

/// Smallest totient that admits a public exponent `1 < e < φ`.
const MIN_TOTIENT: u64 = 4;

/// Public half of a key pair: `(e, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    /// Public exponent
    pub e: u64,
    /// Modulus
    pub n: u64,
}

impl PublicKey {
    /// Create a public key from its exponent and modulus.
    pub fn new(e: u64, n: u64) -> Self {
        Self { e, n }
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e={}, n={}", self.e, self.n)
    }
}

/// Private half of a key pair: `(d, n)`.
///
/// The exponent is zeroized on drop and redacted from `Debug` output.
#[derive(PartialEq, Eq)]
pub struct PrivateKey {
    d: u64,
    n: u64,
}

impl PrivateKey {
    /// Create a private key from its exponent and modulus.
    pub fn new(d: u64, n: u64) -> Self {
        Self { d, n }
    }

    /// Private exponent.
    pub fn exponent(&self) -> u64 {
        self.d
    }

    /// Modulus shared with the public key.
    pub fn modulus(&self) -> u64 {
        self.n
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey").field("d", &"<redacted>").field("n", &self.n).finish()
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.d.zeroize();
    }
}

/// Matching public and private keys derived from the same primes.
///
/// # Invariants
///
/// - `public.n == private.n == p * q`
/// - `1 < e < φ` and `gcd(e, φ) == 1`
/// - `e * d ≡ 1 (mod φ)`
#[derive(Debug)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl KeyPair {
    /// Derive a key pair from two distinct primes.
    ///
    /// See [`generate_keypair`].
    pub fn generate(p: u64, q: u64) -> Result<Self, CryptoError> {
        if !is_prime(p) {
            return Err(CryptoError::NotPrime(p));
        }
        if !is_prime(q) {
            return Err(CryptoError::NotPrime(q));
        }
        if p == q {
            return Err(CryptoError::EqualPrimes(p));
        }

        let n = p.checked_mul(q).ok_or(CryptoError::ModulusOverflow { p, q })?;
        let phi = (p - 1) * (q - 1);

        // {2, 3} is the only distinct prime pair with φ < 4; the search below
        // would never terminate for it.
        if phi < MIN_TOTIENT {
            return Err(CryptoError::DegenerateTotient { phi });
        }

        let e = select_public_exponent(phi);
        let d = mod_inverse(e, phi)?;

        Ok(Self { public: PublicKey { e, n }, private: PrivateKey { d, n } })
    }

    /// Public half, safe to hand to the peer.
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// Private half.
    pub fn private(&self) -> &PrivateKey {
        &self.private
    }
}

/// Derive a key pair from two distinct primes.
///
/// Computes `n = p·q` and `φ = (p−1)(q−1)`, picks `e` starting from
/// [`DEFAULT_PUBLIC_EXPONENT`] and `d = e⁻¹ mod φ`.
///
/// # Errors
///
/// - `NotPrime` if either input fails the primality test
/// - `EqualPrimes` if `p == q`
/// - `ModulusOverflow` if `p·q` exceeds `u64`
/// - `DegenerateTotient` if `φ < 4`
pub fn generate_keypair(p: u64, q: u64) -> Result<KeyPair, CryptoError> {
    KeyPair::generate(p, q)
}

/// Walk odd candidates until one is coprime with `phi` and below it.
///
/// Candidates advance by 2 modulo `phi`; a result below 2 restarts at 3. For
/// even `phi >= 4` the walk visits every odd residue, and `phi - 1` always
/// qualifies, so the loop terminates.
fn select_public_exponent(phi: u64) -> u64 {
    let mut e = DEFAULT_PUBLIC_EXPONENT;
    while gcd(e, phi) != 1 || e >= phi {
        e = (e + 2) % phi;
        if e < 2 {
            e = 3;
        }
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textbook_pair_61_53() {
        let pair = generate_keypair(61, 53).unwrap();

        assert_eq!(*pair.public(), PublicKey::new(19, 3233));
        assert_eq!(pair.private().exponent(), 2299);
        assert_eq!(pair.private().modulus(), 3233);
    }

    #[test]
    fn second_peer_pair_67_71() {
        let pair = generate_keypair(67, 71).unwrap();

        assert_eq!(*pair.public(), PublicKey::new(859, 4757));
        assert_eq!(pair.private().exponent(), 199);
    }

    #[test]
    fn smallest_odd_primes_wrap_exponent() {
        // φ = 8: 65537 wraps to (65539 % 8) = 3
        let pair = generate_keypair(3, 5).unwrap();

        assert_eq!(*pair.public(), PublicKey::new(3, 15));
        assert_eq!(pair.private().exponent(), 3);
    }

    #[test]
    fn large_totient_keeps_default_exponent() {
        let pair = generate_keypair(7919, 7927).unwrap();
        assert_eq!(pair.public().e, DEFAULT_PUBLIC_EXPONENT);
    }

    #[test]
    fn exponent_search_resets_below_two() {
        // φ = 12: 65539 % 12 = 7, coprime
        assert_eq!(select_public_exponent(12), 7);
        // φ = 4: 65539 % 4 = 3
        assert_eq!(select_public_exponent(4), 3);
        // φ = 6: 65539 % 6 = 1 -> reset to 3 -> gcd 3 -> 5
        assert_eq!(select_public_exponent(6), 5);
    }

    #[test]
    fn selected_exponent_is_coprime_and_below_totient() {
        for phi in (4..2000u64).step_by(2) {
            let e = select_public_exponent(phi);
            assert!(e > 1 && e < phi, "e={e} out of range for phi={phi}");
            assert_eq!(gcd(e, phi), 1, "e={e} not coprime with phi={phi}");
        }
    }

    #[test]
    fn rejects_non_prime() {
        assert_eq!(generate_keypair(4, 7).unwrap_err(), CryptoError::NotPrime(4));
        assert_eq!(generate_keypair(7, 9).unwrap_err(), CryptoError::NotPrime(9));
        assert_eq!(generate_keypair(1, 7).unwrap_err(), CryptoError::NotPrime(1));
    }

    #[test]
    fn rejects_equal_primes() {
        assert_eq!(generate_keypair(61, 61).unwrap_err(), CryptoError::EqualPrimes(61));
    }

    #[test]
    fn rejects_degenerate_totient() {
        assert_eq!(generate_keypair(2, 3).unwrap_err(), CryptoError::DegenerateTotient { phi: 2 });
    }

    #[test]
    fn accepts_two_with_larger_prime() {
        let pair = generate_keypair(2, 7).unwrap();
        assert_eq!(pair.public().n, 14);
    }

    #[test]
    fn rejects_overflowing_modulus() {
        let p = 4_294_967_311; // smallest prime above 2^32
        let q = 4_294_967_357;
        assert!(is_prime(p) && is_prime(q));
        assert_eq!(generate_keypair(p, q).unwrap_err(), CryptoError::ModulusOverflow { p, q });
    }

    #[test]
    fn private_key_debug_is_redacted() {
        let pair = generate_keypair(61, 53).unwrap();
        let debug = format!("{:?}", pair.private());
        assert!(!debug.contains("2299"));
        assert!(debug.contains("3233"));
    }
}
