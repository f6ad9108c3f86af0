//! Error types for the ledger engine.
//!
//! Every fallible ledger operation returns a [`LedgerError`]. Policy
//! rejections on insert are *not* errors; they come back as
//! [`crate::chain::Insertion::Rejected`] so callers can tell "the chain said
//! no" apart from "the disk is on fire".

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur while reading, writing or validating a chain.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A block, file or index record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Malformed ledger name, invalid range, empty Merkle leaf list, etc.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A stored block no longer matches its own hash or Merkle root, or
    /// its link to the previous block is broken.
    #[error("block #{index} failed integrity check: {reason}")]
    IntegrityViolation {
        /// Index of the offending block.
        index: u64,
        /// Which check failed.
        reason: String,
    },

    /// The same transaction hash was added twice to one block.
    #[error("duplicate transaction {hash}")]
    DuplicateTransaction {
        /// Hash shared by both transactions.
        hash: String,
    },

    /// The storage collaborator failed to open, lock, read or write a file.
    #[error("storage error: {0}")]
    Storage(#[source] StorageError),

    /// A block file is not valid JSON or misses required fields.
    #[error("malformed block data: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A line of the index log is not `<index>,<hash>`.
    #[error("malformed index record: {line:?}")]
    MalformedIndexRecord {
        /// The offending line, verbatim.
        line: String,
    },
}

/// Missing files surface as [`LedgerError::NotFound`]; every other storage
/// failure is wrapped as [`LedgerError::Storage`].
impl From<StorageError> for LedgerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { path } => LedgerError::NotFound(path.display().to_string()),
            other => LedgerError::Storage(other),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
