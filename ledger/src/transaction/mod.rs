//! # Transaction Module
//!
//! A transaction is an ordered key/value payload and the double hash of its
//! canonical JSON encoding. There are no amounts, signatures or fees at
//! this layer: the ledger stores records, and what they mean is up to the
//! caller.
//!
//! ```text
//! record.rs  — Transaction + Payload, canonical encoding, hashing
//! builder.rs — Fluent TransactionBuilder
//! ```

pub mod builder;
pub mod record;

pub use builder::TransactionBuilder;
pub use record::{Payload, Transaction};
