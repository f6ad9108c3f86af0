//! # Cryptographic Primitives
//!
//! Integrity, not authenticity: the ledger hashes and chains content so
//! tampering is detectable, but nothing here signs anything.
//!
//! - **hash** — SHA-256 / double-hash / RIPEMD-160 helpers.
//! - **merkle** — Merkle root over transaction hashes.
//! - **address** — random 40-hex-character addresses.
//!
//! Everything is a thin wrapper over the RustCrypto `sha2` and `ripemd`
//! crates. Don't roll your own.

pub mod address;
pub mod hash;
pub mod merkle;

pub use address::generate_address;
pub use hash::{double_hash, is_digest, ripemd160_hex, sha256_hex};
pub use merkle::merkle_root;
