//! # Ledger: chain lifecycle over a directory of block files
//!
//! ```text
//!   Uninitialized ──insert(draft)──▶ Active ──insert(draft)──▶ Active ...
//!   (no chain dir)    genesis, #0       (chain dir present)
//! ```
//!
//! Writes go block file first, index record second. Reads go index
//! (locate) → block file (fetch) → [`Block::verify`].

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::iter::{AllOptions, Blocks};
use crate::block::{Block, BlockDraft, SealParams};
use crate::config::{LedgerConfig, BLOCK_FILE_EXTENSION, SHARD_SIZE};
use crate::crypto;
use crate::error::{LedgerError, LedgerResult};
use crate::storage::{FileStore, Index, IndexEntry};

// ---------------------------------------------------------------------------
// Insert Outcome
// ---------------------------------------------------------------------------

/// Why the ledger declined a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A transaction in the draft is already stored in a recent block.
    DuplicateTransaction {
        /// The colliding transaction hash.
        hash: String,
        /// Index of the block that already holds it.
        block: u64,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::DuplicateTransaction { hash, block } => {
                write!(f, "transaction {hash} already stored in block #{block}")
            }
        }
    }
}

/// Result of [`Ledger::insert`].
///
/// A rejection is a normal outcome, not an error. The draft comes back
/// untouched so the caller can drop the offending transaction and retry.
#[derive(Debug)]
pub enum Insertion {
    /// The draft was sealed, mined and persisted.
    Appended(Block),
    /// The draft was declined; nothing was written.
    Rejected {
        draft: BlockDraft,
        reason: Rejection,
    },
}

impl Insertion {
    pub fn is_appended(&self) -> bool {
        matches!(self, Insertion::Appended(_))
    }

    pub fn block(&self) -> Option<&Block> {
        match self {
            Insertion::Appended(block) => Some(block),
            Insertion::Rejected { .. } => None,
        }
    }

    pub fn into_block(self) -> Option<Block> {
        match self {
            Insertion::Appended(block) => Some(block),
            Insertion::Rejected { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// A single-writer, file-backed, hash-chained ledger.
///
/// Only drafts can be inserted, so a block that is already sealed cannot
/// be handed back in:
///
/// ```compile_fail
/// use ledger_core::{Block, Ledger};
///
/// fn reinsert(ledger: &mut Ledger, sealed: Block) {
///     let _ = ledger.insert(sealed);
/// }
/// ```
#[derive(Debug)]
pub struct Ledger {
    name: String,
    path: PathBuf,
    config: LedgerConfig,
    store: FileStore,
    index: Index,
    initialized: bool,
}

impl Ledger {
    /// Open (or prepare to create) the chain `name` under `root`.
    ///
    /// The chain lives in `<root>/<name>`. Nothing is written until the
    /// first [`Self::insert`], which creates the genesis block. A chain
    /// whose directory already exists is treated as initialized, whatever
    /// state its index log is in.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidArgument`] if `name` is empty or contains
    /// anything other than ASCII letters, digits and `-`, or if `config`
    /// fails [`LedgerConfig::validate`].
    pub fn open(name: &str, root: impl AsRef<Path>, config: LedgerConfig) -> LedgerResult<Self> {
        validate_name(name)?;
        config.validate()?;

        let path = root.as_ref().join(name);
        let index = Index::new(&path, config.recent_window);
        let initialized = path.is_dir();

        let ledger = Self {
            name: name.to_string(),
            path,
            config,
            store: FileStore::new(),
            index,
            initialized,
        };

        if ledger.initialized {
            ledger.check_tip();
        }
        debug!(
            ledger = %ledger.name,
            path = %ledger.path.display(),
            initialized = ledger.initialized,
            "ledger opened"
        );

        Ok(ledger)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The chain directory, `<root>/<name>`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Whether the chain directory exists, i.e. genesis has been written.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// A fresh random 40-hex-character address.
    pub fn generate_address() -> String {
        crypto::generate_address()
    }

    /// Location of block `index`: `<path>/<index / SHARD_SIZE>/<index>.json`.
    pub fn block_path(&self, index: u64) -> PathBuf {
        self.path
            .join((index / SHARD_SIZE).to_string())
            .join(format!("{index}.{BLOCK_FILE_EXTENSION}"))
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Seal `draft` onto the end of the chain.
    ///
    /// On an uninitialized ledger the draft becomes the genesis block
    /// (index 0, configured sentinel as `previousHash`). Otherwise it is
    /// linked to the current tip, after checking that none of its
    /// transactions already appear in the last `lookback` blocks. Genesis
    /// is never part of that scan.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidArgument`] for an empty draft. A tip that
    /// fails verification is an [`LedgerError::IntegrityViolation`]; nothing
    /// is appended on top of it. A chain directory with a missing or empty
    /// index log is [`LedgerError::NotFound`]; genesis is never recreated
    /// over it.
    pub fn insert(&mut self, draft: BlockDraft) -> LedgerResult<Insertion> {
        let params = if self.initialized {
            let tip = self.last()?;
            if let Some(reason) = self.find_recent_duplicate(&draft, tip.index())? {
                info!(ledger = %self.name, %reason, "draft rejected");
                return Ok(Insertion::Rejected { draft, reason });
            }
            SealParams {
                index: tip.index() + 1,
                previous_hash: tip.hash().to_string(),
                difficulty: self.config.difficulty,
                version: self.config.version,
            }
        } else {
            SealParams {
                index: 0,
                previous_hash: self.config.genesis_previous_hash.clone(),
                difficulty: self.config.difficulty,
                version: self.config.version,
            }
        };

        let block = draft.seal(params)?;
        self.persist(&block)?;

        if block.index() == 0 {
            self.initialized = true;
            info!(
                ledger = %self.name,
                hash = block.hash(),
                nonce = block.nonce(),
                tx_count = block.tx_count(),
                "genesis block created"
            );
        } else {
            info!(
                ledger = %self.name,
                index = block.index(),
                hash = block.hash(),
                nonce = block.nonce(),
                tx_count = block.tx_count(),
                "block appended"
            );
        }

        Ok(Insertion::Appended(block))
    }

    /// Block file first, then the index record.
    fn persist(&self, block: &Block) -> LedgerResult<()> {
        let path = self.block_path(block.index());
        let json = block.to_json(self.config.pretty_json);
        self.store.write(&path, json.as_bytes(), true)?;

        if !self.store.exists(&path) {
            return Err(LedgerError::NotFound(path.display().to_string()));
        }

        self.index.add(block)
    }

    /// Walk back from `tip` over at most `lookback` blocks, stopping before
    /// genesis, looking for any of the draft's transaction hashes.
    fn find_recent_duplicate(
        &self,
        draft: &BlockDraft,
        tip: u64,
    ) -> LedgerResult<Option<Rejection>> {
        let wanted: HashSet<&str> = draft.transaction_hashes().collect();
        let mut current = tip;

        for _ in 0..self.config.lookback {
            if current == 0 {
                break;
            }
            let block = self.get(current)?;
            if let Some(hash) = block.transaction_hashes().find(|h| wanted.contains(h)) {
                return Ok(Some(Rejection::DuplicateTransaction {
                    hash: hash.to_string(),
                    block: current,
                }));
            }
            current -= 1;
        }

        Ok(None)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Whether the file for block `index` exists. No validation.
    pub fn exists(&self, index: u64) -> bool {
        self.store.exists(&self.block_path(index))
    }

    /// Read and decode block `index` without verifying it.
    pub fn fetch(&self, index: u64) -> LedgerResult<Block> {
        let json = self.store.read(&self.block_path(index))?;
        Block::from_json(&json)
    }

    /// Read, decode and verify block `index`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if the file is missing,
    /// [`LedgerError::IntegrityViolation`] if it no longer matches its own
    /// hash or Merkle root.
    pub fn get(&self, index: u64) -> LedgerResult<Block> {
        let block = self.fetch(index)?;
        block.verify()?;
        Ok(block)
    }

    /// Number of blocks, genesis included. Zero before genesis.
    pub fn count(&self) -> LedgerResult<u64> {
        if !self.initialized {
            return Ok(0);
        }
        Ok(self.index.last()? + 1)
    }

    /// Index records of the `n` most recent blocks, most recent first.
    pub fn list(&self, n: usize) -> LedgerResult<Vec<IndexEntry>> {
        if !self.initialized {
            return Ok(Vec::new());
        }
        self.index.list(n)
    }

    /// The block whose hash is `hash`.
    pub fn find(&self, hash: &str) -> LedgerResult<Block> {
        let index = self
            .index
            .search(hash)?
            .ok_or_else(|| LedgerError::NotFound(format!("block {hash}")))?;
        self.get(index)
    }

    /// The tip of the chain.
    pub fn last(&self) -> LedgerResult<Block> {
        self.get(self.tip_index()?)
    }

    /// Lazily fetch and verify blocks in `[start, finish]`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidArgument`] if `finish` is past the tip or
    /// `start >= finish`. Errors while reading individual blocks are
    /// yielded by the iterator.
    pub fn all(&self, options: AllOptions) -> LedgerResult<Blocks<'_>> {
        let max = self.tip_index()?;
        let finish = options.finish.unwrap_or(max);

        if finish > max {
            return Err(LedgerError::InvalidArgument(format!(
                "finish {finish} is past the tip #{max}"
            )));
        }
        if options.start >= finish {
            return Err(LedgerError::InvalidArgument(format!(
                "start {} must be below finish {finish}",
                options.start
            )));
        }

        Ok(Blocks::new(self, options.start..=finish, options.reverse))
    }

    /// Check every block from genesis to the tip: self-consistency, position
    /// and linkage to its predecessor.
    ///
    /// Returns `Ok(false)` on the first failing block (with a `warn!`
    /// naming it) and `Ok(true)` if the whole chain passes. A block file
    /// that is missing counts as a failure. Undecodable files and I/O
    /// errors are returned as errors.
    pub fn validate(&self) -> LedgerResult<bool> {
        let count = self.count()?;
        let mut previous: Option<String> = None;

        for i in 0..count {
            let block = match self.fetch(i) {
                Ok(block) => block,
                Err(LedgerError::NotFound(what)) => {
                    warn!(ledger = %self.name, index = i, %what, "block file missing");
                    return Ok(false);
                }
                Err(e) => return Err(e),
            };

            if let Err(e) = block.verify() {
                warn!(ledger = %self.name, index = i, error = %e, "block failed verification");
                return Ok(false);
            }
            if block.index() != i {
                warn!(
                    ledger = %self.name,
                    index = i,
                    stored = block.index(),
                    "block stored under the wrong index"
                );
                return Ok(false);
            }
            if let Some(expected) = previous.as_deref() {
                if block.previous_hash() != expected {
                    warn!(
                        ledger = %self.name,
                        index = i,
                        expected,
                        found = block.previous_hash(),
                        "broken link to previous block"
                    );
                    return Ok(false);
                }
            }

            previous = Some(block.hash().to_string());
        }

        debug!(ledger = %self.name, blocks = count, "chain validated");
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn tip_index(&self) -> LedgerResult<u64> {
        if !self.initialized {
            return Err(LedgerError::NotFound(format!(
                "genesis block of ledger {}",
                self.name
            )));
        }
        self.index.last()
    }

    /// Warn when the index is unreadable or names a tip whose block file is
    /// gone.
    fn check_tip(&self) {
        match self.index.tip() {
            Ok(tip) if !self.exists(tip.index) => warn!(
                ledger = %self.name,
                index = tip.index,
                "index tip has no block file"
            ),
            Ok(_) => {}
            Err(e) => warn!(ledger = %self.name, error = %e, "could not read index tip"),
        }
    }
}

/// Ledger names become directory names: ASCII letters, digits and `-`.
fn validate_name(name: &str) -> LedgerResult<()> {
    if name.is_empty() {
        return Err(LedgerError::InvalidArgument(
            "ledger name may not be empty".to_string(),
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(LedgerError::InvalidArgument(format!(
            "ledger name {name:?} may only contain letters, digits and '-'"
        )));
    }
    Ok(())
}
