//! # Chain Module
//!
//! The [`Ledger`] orchestrator: genesis, insertion, retrieval, iteration
//! and whole-chain validation over one chain directory.
//!
//! ```text
//! ledger.rs — Ledger, Insertion, Rejection
//! iter.rs   — AllOptions, Blocks (lazy range reads)
//! ```

pub mod iter;
pub mod ledger;

pub use iter::{AllOptions, Blocks};
pub use ledger::{Insertion, Ledger, Rejection};
