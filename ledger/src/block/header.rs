//! Block header: the six fields that get hashed.
//!
//! The block hash is `double_hash(version ++ previousHash ++ merkleRoot ++
//! timestamp ++ difficulty ++ nonce)`, a plain string concatenation of
//! each field's decimal or hex text with no separators and no field
//! names. Adding fields here does not make the hash stronger; it only
//! breaks every stored chain.

use crate::crypto::hash::double_hash;

/// The hashed portion of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Chain version the block was written under.
    pub version: u32,
    /// Hash of the previous block (the genesis sentinel for block 0).
    pub previous_hash: String,
    /// Merkle root of the block's transaction hashes.
    pub merkle_root: String,
    /// Unix timestamp (seconds) at which the block was sealed.
    pub timestamp: u64,
    /// Proof-of-work difficulty the block was mined at.
    pub difficulty: u32,
    /// Proof-of-work counter.
    pub nonce: u64,
}

impl BlockHeader {
    /// The exact text fed to the hash function.
    pub fn preimage(&self) -> String {
        format!(
            "{}{}{}{}{}{}",
            self.version,
            self.previous_hash,
            self.merkle_root,
            self.timestamp,
            self.difficulty,
            self.nonce
        )
    }

    /// Hash of the header in its current state.
    pub fn compute_hash(&self) -> String {
        double_hash(self.preimage())
    }
}
