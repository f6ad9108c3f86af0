// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledger Core
//!
//! A single-writer, file-backed, hash-chained ledger. Blocks are JSON files
//! on disk, each one sealed by a double SHA-256 over its header and a
//! Merkle root over its transactions, and linked to its predecessor by
//! hash. An append-only index log maps block numbers to hashes.
//!
//! What you get is tamper *detection*: edit any stored byte and
//! [`Ledger::validate`] notices. There are no signatures, no peers and no
//! consensus. One process writes; anyone can read.
//!
//! ## Architecture
//!
//! - **crypto** — SHA-256 double hash, Merkle root, address generation.
//! - **transaction** — ordered key/value payloads and their content hash.
//! - **block** — drafts, sealed blocks, headers, proof-of-work.
//! - **storage** — locked file access and the block index log.
//! - **chain** — the [`Ledger`] orchestrator.
//! - **config** — on-disk constants and [`LedgerConfig`].
//! - **error** — [`LedgerError`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use ledger_core::{BlockDraft, Ledger, LedgerConfig, TransactionBuilder};
//!
//! # fn main() -> Result<(), ledger_core::LedgerError> {
//! let mut ledger = Ledger::open("payments", "/var/lib/ledger", LedgerConfig::default())?;
//!
//! let tx = TransactionBuilder::new()
//!     .field("from", "tony")
//!     .field("to", "jon")
//!     .field("amount", 500)
//!     .build();
//!
//! let mut draft = BlockDraft::new();
//! draft.add_transaction(tx)?;
//! ledger.insert(draft)?;
//!
//! assert!(ledger.validate()?);
//! # Ok(())
//! # }
//! ```

pub mod block;
pub mod chain;
pub mod config;
pub mod crypto;
pub mod error;
pub mod storage;
pub mod transaction;

pub use block::{Block, BlockDraft, BlockHeader, SealParams};
pub use chain::{AllOptions, Blocks, Insertion, Ledger, Rejection};
pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use storage::{IndexEntry, StorageError};
pub use transaction::{Payload, Transaction, TransactionBuilder};
