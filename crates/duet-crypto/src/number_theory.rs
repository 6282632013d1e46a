//! Integer arithmetic behind key generation and the codec.
//!
//! Everything operates on `u64`. Products are widened to `u128` so modular
//! multiplication is exact for any modulus below 2^64.

use crate::error::CryptoError;

/// Primality by trial division up to `floor(sqrt(num))`.
///
/// Returns false for `num < 2`.
pub fn is_prime(num: u64) -> bool {
    if num < 2 {
        return false;
    }

    let mut divisor = 2u64;
    // divisor <= num / divisor  <=>  divisor^2 <= num, without overflow
    while divisor <= num / divisor {
        if num % divisor == 0 {
            return false;
        }
        divisor += 1;
    }

    true
}

/// Greatest common divisor (Euclid). Zero only when both inputs are zero.
pub fn gcd(a: u64, b: u64) -> u64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Multiplicative inverse of `e` modulo `phi` via the extended Euclidean
/// algorithm.
///
/// The result `x` lies in `[0, phi)` and satisfies `(e * x) % phi == 1`.
///
/// # Errors
///
/// - `NoModularInverse` if `gcd(e, phi) != 1` or `phi < 2`
pub fn mod_inverse(e: u64, phi: u64) -> Result<u64, CryptoError> {
    if phi < 2 {
        return Err(CryptoError::NoModularInverse { e, phi });
    }

    let modulus = i128::from(phi);
    let (mut old_r, mut r) = (i128::from(e % phi), modulus);
    let (mut old_s, mut s) = (1i128, 0i128);

    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_s, s) = (s, old_s - quotient * s);
    }

    if old_r != 1 {
        return Err(CryptoError::NoModularInverse { e, phi });
    }

    Ok(old_s.rem_euclid(modulus) as u64)
}

/// `base^exp mod modulus` by square-and-multiply.
///
/// Moduli of 0 and 1 yield 0.
pub fn mod_pow(base: u64, exp: u64, modulus: u64) -> u64 {
    if modulus <= 1 {
        return 0;
    }

    let m = u128::from(modulus);
    let mut result = 1u128;
    let mut base = u128::from(base) % m;
    let mut exp = exp;

    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % m;
        }
        base = base * base % m;
        exp >>= 1;
    }

    result as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_are_not_prime() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
    }

    #[test]
    fn known_primes() {
        for p in [2, 3, 5, 7, 11, 53, 61, 67, 71, 7919, 65_537] {
            assert!(is_prime(p), "{p} should be prime");
        }
    }

    #[test]
    fn known_composites() {
        for c in [4, 6, 9, 15, 25, 49, 3233, 4757, 65_535] {
            assert!(!is_prime(c), "{c} should be composite");
        }
    }

    #[test]
    fn square_of_prime_is_composite() {
        // Trial division must include sqrt(num) itself
        assert!(!is_prime(61 * 61));
        assert!(!is_prime(7919 * 7919));
    }

    #[test]
    fn gcd_basics() {
        assert_eq!(gcd(0, 0), 0);
        assert_eq!(gcd(0, 9), 9);
        assert_eq!(gcd(9, 0), 9);
        assert_eq!(gcd(65_537, 3120), 1);
        assert_eq!(gcd(12, 18), 6);
    }

    #[test]
    fn mod_inverse_of_textbook_exponent() {
        assert_eq!(mod_inverse(17, 3120), Ok(2753));
        assert_eq!(mod_inverse(19, 3120), Ok(2299));
        assert_eq!(mod_inverse(3, 8), Ok(3));
    }

    #[test]
    fn mod_inverse_reduces_large_e() {
        let inverse = mod_inverse(65_537, 4620).unwrap();
        assert_eq!((65_537u64 % 4620) * inverse % 4620, 1);
    }

    #[test]
    fn mod_inverse_requires_coprime_inputs() {
        assert_eq!(mod_inverse(4, 8), Err(CryptoError::NoModularInverse { e: 4, phi: 8 }));
        assert_eq!(mod_inverse(0, 8), Err(CryptoError::NoModularInverse { e: 0, phi: 8 }));
        assert_eq!(mod_inverse(5, 1), Err(CryptoError::NoModularInverse { e: 5, phi: 1 }));
    }

    #[test]
    fn mod_pow_basics() {
        assert_eq!(mod_pow(4, 13, 497), 445);
        assert_eq!(mod_pow(5, 0, 13), 1);
        assert_eq!(mod_pow(0, 5, 13), 0);
        assert_eq!(mod_pow(7, 3, 1), 0);
    }

    #[test]
    fn mod_pow_does_not_overflow_near_u64_max() {
        let modulus = u64::MAX - 58; // largest prime below 2^64
        let base = modulus - 1;
        // (-1)^2 == 1
        assert_eq!(mod_pow(base, 2, modulus), 1);
    }
}
