//! # Storage Module
//!
//! Plain files on a local filesystem. No database, no daemon.
//!
//! ## Architecture
//!
//! ```text
//! fs.rs    — FileStore: locked read/write/append, tail and reverse scans
//! index.rs — Index: the append-only `<index>,<hash>` log
//! ```
//!
//! ## Directory Layout
//!
//! ```text
//! <root>/<name>/
//! ├── blockchain.idx
//! ├── 0/            blocks 0 .. 31_999
//! │   ├── 0.json
//! │   └── 1.json
//! └── 1/            blocks 32_000 .. 63_999
//!     └── 32000.json
//! ```
//!
//! A block file is always written before its index record is appended.
//! A crash between the two leaves an unindexed block file, which every
//! read path ignores.

pub mod fs;
pub mod index;

pub use fs::{FileStore, ReverseLines, StorageError, StorageResult};
pub use index::{Index, IndexEntry};
