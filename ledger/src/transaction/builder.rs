//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] collects payload fields in the order they are
//! supplied and hands back a [`Transaction`] whose hash is already
//! computed. Field order is part of the hash, so the builder never sorts.

use serde_json::Value;

use super::record::{Payload, Transaction};

/// Fluent builder for [`Transaction`].
///
/// ```
/// use ledger_core::transaction::TransactionBuilder;
///
/// let tx = TransactionBuilder::new()
///     .field("to", "jon")
///     .field("from", "tony")
///     .field("amount", 500)
///     .build();
///
/// assert_eq!(tx.canonical_encoding(), r#"{"to":"jon","from":"tony","amount":500}"#);
/// assert!(tx.hash().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    data: Payload,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Re-setting an existing key keeps its original position.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Append every `(key, value)` pair from `fields`, in iteration order.
    pub fn fields<K, V, I>(mut self, fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in fields {
            self.data.insert(key.into(), value.into());
        }
        self
    }

    /// Finish the transaction and compute its hash.
    pub fn build(self) -> Transaction {
        let mut tx = Transaction::new(self.data);
        tx.ensure_hash();
        tx
    }
}
