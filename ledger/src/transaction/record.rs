//! The transaction record: an ordered payload plus its content hash.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::crypto::hash::double_hash;

/// Transaction payload: string keys in insertion order mapped to JSON values.
///
/// Key order is significant: `{"a":1,"b":2}` and `{"b":2,"a":1}` hash
/// differently.
pub type Payload = Map<String, Value>;

/// A payload record with a content hash.
///
/// The hash covers the payload only. Two transactions carrying identical
/// data share a hash, and blocks and the ledger's lookback window treat
/// that as a duplicate.
///
/// Serialized as `{"hash": ..., "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// `double_hash(canonical_encoding(data))`, `None` until computed.
    ///
    /// When a transaction is read back from a block file this is the
    /// *stored* hash, trusted as-is. [`crate::block::Block::verify`]
    /// catches any mismatch through the Merkle root. Adding a transaction
    /// to a [`crate::block::BlockDraft`] recomputes it.
    pub hash: Option<String>,

    /// The payload.
    pub data: Payload,
}

impl Transaction {
    /// Wrap `data` in a transaction. The hash is left unset.
    pub fn new(data: Payload) -> Self {
        Self { hash: None, data }
    }

    /// Compact JSON of the payload, keys in insertion order, Unicode and `/`
    /// left unescaped. This is the exact text that gets hashed.
    pub fn canonical_encoding(&self) -> String {
        // A `Map<String, Value>` always serializes; the default is unreachable.
        serde_json::to_string(&self.data).unwrap_or_default()
    }

    /// Recompute the content hash from the current payload.
    pub fn compute_hash(&self) -> String {
        double_hash(self.canonical_encoding())
    }

    /// Stored hash, if any.
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Fill in the hash if it has not been computed yet and return it.
    pub fn ensure_hash(&mut self) -> &str {
        if self.hash.is_none() {
            self.hash = Some(self.compute_hash());
        }
        self.hash.as_deref().unwrap_or_default()
    }

    /// Overwrite the stored hash with one computed from the current payload
    /// and return it.
    pub fn refresh_hash(&mut self) -> &str {
        let hash = self.compute_hash();
        self.hash.insert(hash).as_str()
    }

    /// Pretty-printed `{hash, data}` record.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
