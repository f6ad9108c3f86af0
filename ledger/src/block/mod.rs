//! # Block Module
//!
//! A block is a header (linking and proof-of-work fields) plus an ordered
//! list of transactions, sealed by its own hash.
//!
//! ## Lifecycle
//!
//! ```text
//!  BlockDraft ──add_transaction()──▶ BlockDraft
//!      │
//!      └──seal(SealParams)──▶ Block   (merkle root, timestamp, hash, PoW)
//! ```
//!
//! Sealing consumes the draft. A [`Block`] has no setters; the only way to
//! get a different one is to decode a different file.
//!
//! ```text
//! header.rs — BlockHeader and the hash preimage
//! draft.rs  — BlockDraft, SealParams
//! sealed.rs — Block, verification, JSON file format
//! pow.rs    — proof-of-work miner
//! ```

pub mod draft;
pub mod header;
pub mod pow;
pub mod sealed;

pub use draft::{BlockDraft, SealParams};
pub use header::BlockHeader;
pub use pow::{meets_difficulty, MiningOutcome};
pub use sealed::Block;
