//! Fuzz target for key generation and the character cipher
//!
//! # Invariants
//!
//! - Key generation either succeeds with n = p * q and e * d = 1 (mod phi),
//!   or returns an error; it never panics or loops forever
//! - Text whose code points are all below n round-trips
//! - Decrypting arbitrary integers never panics

#![no_main]

use arbitrary::Arbitrary;
use duet_crypto::{KeyPair, decrypt, encrypt};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct Input {
    p: u16,
    q: u16,
    text: String,
    garbage: Vec<u64>,
}

fuzz_target!(|input: Input| {
    let (p, q) = (u64::from(input.p), u64::from(input.q));
    let Ok(keypair) = KeyPair::generate(p, q) else {
        return;
    };

    let public = keypair.public();
    let private = keypair.private();
    let phi = (p - 1) * (q - 1);
    assert_eq!(public.n, p * q);
    assert_eq!(private.modulus(), public.n);
    assert_eq!(u128::from(public.e) * u128::from(private.exponent()) % u128::from(phi), 1);

    let text: String = input.text.chars().filter(|c| u64::from(u32::from(*c)) < public.n).collect();
    let ciphertext = encrypt(public, &text);
    assert_eq!(decrypt(private, ciphertext.as_slice()).ok(), Some(text));

    let _ = decrypt(private, &input.garbage);
});
