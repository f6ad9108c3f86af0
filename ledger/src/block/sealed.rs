//! Sealed blocks and their on-disk JSON form.
//!
//! ## File Format
//!
//! One compact JSON object per block, keys in this exact order:
//!
//! ```text
//! hash, version, previousHash, merkleRoot, timestamp, difficulty, nonce,
//! index, noTransactions, transactions[{hash, data}]
//! ```
//!
//! Unicode and `/` are written unescaped. Decoding trusts each stored
//! transaction hash; [`Block::verify`] recomputes them from the payloads
//! when it rebuilds the Merkle root, so tampered payloads are still caught.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::header::BlockHeader;
use crate::crypto::merkle::merkle_root;
use crate::error::{LedgerError, LedgerResult};
use crate::transaction::Transaction;

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// An immutable, sealed block.
///
/// Only [`super::BlockDraft::seal`] and [`Block::from_json`] produce one.
/// Nothing outside this crate can change a field after the fact, which
/// leaves files on disk as the only place tampering can happen.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub(crate) hash: String,
    pub(crate) header: BlockHeader,
    pub(crate) index: u64,
    pub(crate) transactions: Vec<Transaction>,
}

impl Block {
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// The six hashed header fields.
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn version(&self) -> u32 {
        self.header.version
    }

    pub fn previous_hash(&self) -> &str {
        &self.header.previous_hash
    }

    pub fn merkle_root(&self) -> &str {
        &self.header.merkle_root
    }

    pub fn timestamp(&self) -> u64 {
        self.header.timestamp
    }

    pub fn difficulty(&self) -> u32 {
        self.header.difficulty
    }

    pub fn nonce(&self) -> u64 {
        self.header.nonce
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// `noTransactions` in the file format.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Stored transaction hashes, in block order.
    pub fn transaction_hashes(&self) -> impl Iterator<Item = &str> {
        self.transactions.iter().filter_map(Transaction::hash)
    }

    /// Merkle root recomputed from the *current* transaction payloads.
    pub fn compute_merkle_root(&self) -> LedgerResult<String> {
        let hashes: Vec<String> = self
            .transactions
            .iter()
            .map(Transaction::compute_hash)
            .collect();
        merkle_root(&hashes)
    }

    /// Recompute the hash and Merkle root and compare them with the stored
    /// values.
    ///
    /// # Errors
    ///
    /// [`LedgerError::IntegrityViolation`] naming the first check that
    /// failed. A block with no transactions has no Merkle root and always
    /// fails.
    pub fn verify(&self) -> LedgerResult<()> {
        let computed = self.header.compute_hash();
        if computed != self.hash {
            return Err(LedgerError::IntegrityViolation {
                index: self.index,
                reason: format!("hash mismatch: stored={}, computed={}", self.hash, computed),
            });
        }

        let root = self
            .compute_merkle_root()
            .map_err(|e| LedgerError::IntegrityViolation {
                index: self.index,
                reason: e.to_string(),
            })?;
        if root != self.header.merkle_root {
            return Err(LedgerError::IntegrityViolation {
                index: self.index,
                reason: format!(
                    "merkle root mismatch: stored={}, computed={}",
                    self.header.merkle_root, root
                ),
            });
        }

        Ok(())
    }

    /// `true` when [`Self::verify`] passes.
    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// Encode in the block file format, compact or pretty-printed.
    pub fn to_json(&self, pretty: bool) -> String {
        let record = BlockRecordRef::from(self);
        let encoded = if pretty {
            serde_json::to_string_pretty(&record)
        } else {
            serde_json::to_string(&record)
        };
        // Every field is a string, integer or JSON map: encoding cannot fail.
        encoded.unwrap_or_default()
    }

    /// Decode a block file.
    ///
    /// Does not verify anything; call [`Self::verify`] for that.
    pub fn from_json(json: &str) -> LedgerResult<Self> {
        let record: BlockRecord = serde_json::from_str(json)?;
        Ok(record.into())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json(false))
    }
}

// ---------------------------------------------------------------------------
// Wire Records
// ---------------------------------------------------------------------------

/// Borrowed view used for encoding; field order is the file format.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockRecordRef<'a> {
    hash: &'a str,
    version: u32,
    previous_hash: &'a str,
    merkle_root: &'a str,
    timestamp: u64,
    difficulty: u32,
    nonce: u64,
    index: u64,
    no_transactions: usize,
    transactions: &'a [Transaction],
}

impl<'a> From<&'a Block> for BlockRecordRef<'a> {
    fn from(block: &'a Block) -> Self {
        Self {
            hash: &block.hash,
            version: block.header.version,
            previous_hash: &block.header.previous_hash,
            merkle_root: &block.header.merkle_root,
            timestamp: block.header.timestamp,
            difficulty: block.header.difficulty,
            nonce: block.header.nonce,
            index: block.index,
            no_transactions: block.transactions.len(),
            transactions: &block.transactions,
        }
    }
}

/// Owned record used for decoding. `noTransactions` is derived data and
/// ignored on the way in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockRecord {
    hash: String,
    version: u32,
    previous_hash: String,
    merkle_root: String,
    timestamp: u64,
    difficulty: u32,
    nonce: u64,
    index: u64,
    transactions: Vec<Transaction>,
}

impl From<BlockRecord> for Block {
    fn from(record: BlockRecord) -> Self {
        Self {
            hash: record.hash,
            header: BlockHeader {
                version: record.version,
                previous_hash: record.previous_hash,
                merkle_root: record.merkle_root,
                timestamp: record.timestamp,
                difficulty: record.difficulty,
                nonce: record.nonce,
            },
            index: record.index,
            transactions: record.transactions,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockDraft, SealParams};
    use crate::transaction::TransactionBuilder;
    use serde_json::json;

    /// Block file written by earlier tooling. Its hash was computed before
    /// the Merkle root was filled in, so it deliberately does not verify.
    const FIXTURE_JSON: &str = r#"{"hash":"16e3cb59ed8cd1a0e742cd5526bc8d38c90bb4a3992aa832a53c829c7462b37c","version":1,"previousHash":"0000000000000000000000000000000000000000000000000000000000000000","merkleRoot":"19025cfb2e48ef0b51e60eb2954e76a4b89c9921089c92f391f675f196c65a91","timestamp":1604145600,"difficulty":0,"nonce":0,"index":0,"noTransactions":1,"transactions":[{"hash":"c4bd970c8e32582baabae94714dfb137e93aecb0e11999bc57ce018a401836b7","data":{"date":"2020-10-25 10:55:23","to":"jon","from":"tony","amount":500}}]}"#;

    fn sealed(difficulty: u32) -> Block {
        let tx = TransactionBuilder::new()
            .field("date", "2020-10-25 10:55:23")
            .field("to", "jon")
            .field("from", "tony")
            .field("amount", 500)
            .build();
        BlockDraft::new()
            .with_transaction(tx)
            .unwrap()
            .seal_at(
                SealParams {
                    index: 0,
                    previous_hash: "0".repeat(64),
                    difficulty,
                    version: 1,
                },
                1_604_145_600,
            )
            .unwrap()
    }

    #[test]
    fn fixture_round_trips_byte_for_byte() {
        let block = Block::from_json(FIXTURE_JSON).unwrap();
        assert_eq!(block.to_json(false), FIXTURE_JSON);
        assert_eq!(block.to_string(), FIXTURE_JSON);
    }

    #[test]
    fn fixture_merkle_root_matches_its_transaction() {
        let block = Block::from_json(FIXTURE_JSON).unwrap();
        assert_eq!(block.compute_merkle_root().unwrap(), block.merkle_root());
    }

    #[test]
    fn fixture_hash_was_taken_without_a_merkle_root() {
        let block = Block::from_json(FIXTURE_JSON).unwrap();
        let mut header = block.header().clone();
        header.merkle_root.clear();
        assert_eq!(header.compute_hash(), block.hash());
        assert!(!block.is_valid());
    }

    #[test]
    fn sealed_block_reproduces_fixture_roots() {
        let block = sealed(0);
        assert_eq!(
            block.merkle_root(),
            "19025cfb2e48ef0b51e60eb2954e76a4b89c9921089c92f391f675f196c65a91"
        );
        assert_eq!(
            block.transaction_hashes().collect::<Vec<_>>(),
            vec!["c4bd970c8e32582baabae94714dfb137e93aecb0e11999bc57ce018a401836b7"]
        );
        assert!(block.is_valid());
    }

    #[test]
    fn header_tampering_is_detected() {
        let block = sealed(1);
        assert!(block.is_valid());

        let mut copy = block.clone();
        copy.header.timestamp += 86_400;
        assert!(!copy.is_valid());

        let mut copy = block.clone();
        copy.header.nonce += 1;
        assert!(!copy.is_valid());

        let mut copy = block.clone();
        copy.header.previous_hash = "1".repeat(64);
        assert!(!copy.is_valid());

        let mut copy = block.clone();
        copy.header.version = 2;
        assert!(!copy.is_valid());

        let mut copy = block.clone();
        copy.header.difficulty = 0;
        assert!(!copy.is_valid());

        let mut copy = block.clone();
        copy.header.merkle_root = "2".repeat(64);
        assert!(!copy.is_valid());

        // Rehashing a forged root still leaves it disagreeing with the payload.
        let mut copy = block;
        copy.header.merkle_root = "2".repeat(64);
        copy.hash = copy.header.compute_hash();
        let err = copy.verify().unwrap_err();
        assert!(err.to_string().contains("merkle root mismatch"));
    }

    #[test]
    fn payload_tampering_is_detected() {
        let mut copy = sealed(0);
        copy.transactions[0]
            .data
            .insert("amount".to_string(), json!(5000));
        let err = copy.verify().unwrap_err();
        assert!(err.to_string().contains("merkle root mismatch"));
    }

    #[test]
    fn pretty_output_decodes_to_the_same_block() {
        let block = sealed(0);
        let pretty = block.to_json(true);
        assert!(pretty.contains("\n    \"previousHash\""));
        assert_eq!(Block::from_json(&pretty).unwrap(), block);
    }

    #[test]
    fn key_order_follows_file_format() {
        let json = sealed(0).to_json(false);
        let keys = [
            "\"hash\"",
            "\"version\"",
            "\"previousHash\"",
            "\"merkleRoot\"",
            "\"timestamp\"",
            "\"difficulty\"",
            "\"nonce\"",
            "\"index\"",
            "\"noTransactions\"",
            "\"transactions\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn malformed_json_is_a_deserialization_error() {
        assert!(matches!(
            Block::from_json("{\"hash\": 12"),
            Err(LedgerError::Deserialization(_))
        ));
    }
}
