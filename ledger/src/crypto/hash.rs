//! # Hashing Utilities
//!
//! All content addressing in the ledger goes through [`double_hash`]:
//! SHA-256 applied twice, the second pass running over the lowercase
//! **hex text** of the first digest (not its raw bytes). That hex-of-hex
//! chaining is part of the on-disk format: change it and every stored
//! block hash, transaction hash and Merkle root stops verifying.
//!
//! RIPEMD-160 is only used for address generation, see
//! [`super::address`].

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::config::DIGEST_HEX_LENGTH;

/// Compute SHA-256 and return it as 64 lowercase hex characters.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute RIPEMD-160 and return it as 40 lowercase hex characters.
pub fn ripemd160_hex(data: &[u8]) -> String {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// The ledger's content-addressing primitive: `sha256_hex(sha256_hex(data))`.
///
/// # Example
///
/// ```
/// use ledger_core::crypto::{double_hash, sha256_hex};
///
/// let digest = double_hash("blockchain");
/// assert_eq!(digest, sha256_hex(sha256_hex(b"blockchain").as_bytes()));
/// assert_eq!(digest.len(), 64);
/// ```
pub fn double_hash(data: impl AsRef<[u8]>) -> String {
    sha256_hex(sha256_hex(data.as_ref()).as_bytes())
}

/// Whether `candidate` has the shape of a digest produced by [`double_hash`].
pub fn is_digest(candidate: &str) -> bool {
    candidate.len() == DIGEST_HEX_LENGTH
        && candidate
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn ripemd160_known_vector() {
        assert_eq!(
            ripemd160_hex(b""),
            "9c1185a5c5e9fc54612808977ee8f548b2258d31"
        );
    }

    #[test]
    fn double_hash_chains_over_hex_text() {
        let inner = sha256_hex(b"blockchain");
        assert_eq!(double_hash("blockchain"), sha256_hex(inner.as_bytes()));
        assert_ne!(double_hash("blockchain"), inner);
    }

    #[test]
    fn double_hash_is_lowercase_hex() {
        let digest = double_hash(b"ledger");
        assert!(is_digest(&digest));
        assert_eq!(digest, digest.to_lowercase());
    }

    #[test]
    fn digest_shape_check() {
        assert!(is_digest(&"0".repeat(64)));
        assert!(!is_digest("foo"));
        assert!(!is_digest(&"A".repeat(64)));
        assert!(!is_digest(&"0".repeat(63)));
    }
}
