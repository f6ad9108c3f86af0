//! Bitcoin-flavoured address generation.
//!
//! 16 random bytes → hex text → SHA-256 (hex text) → RIPEMD-160 over the
//! **ASCII bytes of that hex text** → 40 hex characters. Note this is not
//! Bitcoin's `hash160`, which runs RIPEMD-160 over the raw SHA-256 bytes;
//! the text-based chaining is kept so addresses stay format-compatible
//! with chains written by earlier tooling.

use rand::RngCore;

use crate::crypto::hash::{ripemd160_hex, sha256_hex};

/// Number of random bytes behind each address.
pub const ADDRESS_SEED_LENGTH: usize = 16;

/// Generate a fresh random address.
///
/// ```
/// let address = ledger_core::crypto::generate_address();
/// assert_eq!(address.len(), 40);
/// assert!(address.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
pub fn generate_address() -> String {
    let mut seed = [0u8; ADDRESS_SEED_LENGTH];
    rand::thread_rng().fill_bytes(&mut seed);
    address_from_seed(&seed)
}

/// Deterministic core of [`generate_address`].
pub fn address_from_seed(seed: &[u8; ADDRESS_SEED_LENGTH]) -> String {
    let seed_hex = hex::encode(seed);
    let sha = sha256_hex(seed_hex.as_bytes());
    ripemd160_hex(sha.as_bytes())
}
