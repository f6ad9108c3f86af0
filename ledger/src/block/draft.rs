//! Unsealed blocks.
//!
//! A [`BlockDraft`] is the only mutable stage of a block's life: collect
//! transactions, then [`BlockDraft::seal`] it. Sealing consumes the draft
//! and returns an immutable [`Block`], so a block cannot be sealed twice
//! and cannot pick up a second timestamp.

use chrono::Utc;
use tracing::debug;

use super::header::BlockHeader;
use super::pow;
use super::sealed::Block;
use crate::crypto::merkle::merkle_root;
use crate::error::{LedgerError, LedgerResult};
use crate::transaction::Transaction;

/// Linking and proof-of-work fields assigned at seal time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealParams {
    /// Position of the block in the chain.
    pub index: u64,
    /// Hash of the block at `index - 1`, or the genesis sentinel.
    pub previous_hash: String,
    /// Leading hex zeros the block hash must carry.
    pub difficulty: u32,
    /// Chain version.
    pub version: u32,
}

/// A block still being assembled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockDraft {
    transactions: Vec<Transaction>,
}

impl BlockDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `tx` after recomputing its hash from the payload.
    ///
    /// Any hash already carried by `tx` is replaced, so the stored hash
    /// always matches the data.
    ///
    /// # Errors
    ///
    /// [`LedgerError::DuplicateTransaction`] if a transaction with the same
    /// hash is already in this draft. The draft is left unchanged.
    pub fn add_transaction(&mut self, mut tx: Transaction) -> LedgerResult<()> {
        let hash = tx.refresh_hash().to_string();

        if self.transactions.iter().any(|t| t.hash() == Some(hash.as_str())) {
            return Err(LedgerError::DuplicateTransaction { hash });
        }

        self.transactions.push(tx);
        Ok(())
    }

    /// Builder-style [`Self::add_transaction`].
    pub fn with_transaction(mut self, tx: Transaction) -> LedgerResult<Self> {
        self.add_transaction(tx)?;
        Ok(self)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Number of transactions (`noTransactions` once sealed).
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Hashes of the draft's transactions, in order.
    pub fn transaction_hashes(&self) -> impl Iterator<Item = &str> {
        self.transactions.iter().filter_map(Transaction::hash)
    }

    /// Seal the draft with the current wall-clock time and mine it.
    pub fn seal(self, params: SealParams) -> LedgerResult<Block> {
        let timestamp = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        self.seal_at(params, timestamp)
    }

    /// Seal with an explicit timestamp and mine it.
    ///
    /// Assigns the header fields, computes the Merkle root over the
    /// transaction hashes and the header hash, then walks the nonce until
    /// the hash meets `params.difficulty`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidArgument`] for an empty draft (there is no
    /// Merkle root over zero transactions).
    pub fn seal_at(self, params: SealParams, timestamp: u64) -> LedgerResult<Block> {
        let hashes: Vec<String> = self
            .transactions
            .iter()
            .map(Transaction::compute_hash)
            .collect();
        let merkle_root = merkle_root(&hashes)?;

        let mut header = BlockHeader {
            version: params.version,
            previous_hash: params.previous_hash,
            merkle_root,
            timestamp,
            difficulty: params.difficulty,
            nonce: 0,
        };
        let initial = header.compute_hash();
        let outcome = pow::mine(&mut header, initial);

        debug!(
            index = params.index,
            nonce = outcome.nonce,
            attempts = outcome.attempts,
            "block sealed"
        );

        Ok(Block {
            hash: outcome.hash,
            header,
            index: params.index,
            transactions: self.transactions,
        })
    }
}
