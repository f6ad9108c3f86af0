//! # Ledger Configuration & Constants
//!
//! Every magic number in the ledger lives here. On-disk layout constants are
//! part of the file format: changing them after a chain has been written
//! makes the existing directory unreadable, so treat them as frozen.
//!
//! Runtime knobs (difficulty, lookback, ...) live in [`LedgerConfig`], which
//! is handed to [`crate::chain::Ledger::open`] exactly once and never
//! mutated afterwards. No global state, no environment lookups in here.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

// ---------------------------------------------------------------------------
// On-disk Layout
// ---------------------------------------------------------------------------

/// Maximum number of block files per shard directory.
///
/// `ls`/`find` read directories through `readdir`, which gets painful past
/// a few tens of thousands of entries. Block `n` lives in directory
/// `n / SHARD_SIZE`.
pub const SHARD_SIZE: u64 = 32_000;

/// File name of the append-only secondary index inside the chain directory.
pub const INDEX_FILE_NAME: &str = "blockchain.idx";

/// Extension used for block files.
pub const BLOCK_FILE_EXTENSION: &str = "json";

// ---------------------------------------------------------------------------
// Digests
// ---------------------------------------------------------------------------

/// Length of a digest in hex characters (SHA-256 → 32 bytes → 64 chars).
pub const DIGEST_HEX_LENGTH: usize = 64;

/// Length of a generated address in hex characters (RIPEMD-160 → 20 bytes).
pub const ADDRESS_HEX_LENGTH: usize = 40;

/// `previousHash` of the genesis block unless configured otherwise.
pub const GENESIS_PREVIOUS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

// ---------------------------------------------------------------------------
// Index Scanning
// ---------------------------------------------------------------------------

/// Widest possible index record: `u64::MAX` has 20 digits, then a comma,
/// a full digest and the trailing newline.
pub const MAX_INDEX_RECORD_WIDTH: usize = 20 + 1 + DIGEST_HEX_LENGTH + 1;

/// Trailing window read by [`crate::storage::Index::last`].
///
/// Two records wide, so the final record is always fully inside the window
/// no matter where the previous one ends.
pub const INDEX_TAIL_BUFFER: usize = 2 * MAX_INDEX_RECORD_WIDTH;

/// Chunk size used when scanning the index log backwards.
pub const REVERSE_SCAN_CHUNK: usize = 4096;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default proof-of-work difficulty (leading hex zeros).
pub const DEFAULT_DIFFICULTY: u32 = 8;

/// Default chain version stamped into every block header.
pub const DEFAULT_VERSION: u32 = 1;

/// Default number of blocks scanned for duplicate transactions.
pub const DEFAULT_LOOKBACK: u64 = 25;

/// Default number of index records searched backwards before falling back
/// to a full forward scan.
pub const DEFAULT_RECENT_WINDOW: usize = 1000;

// ---------------------------------------------------------------------------
// LedgerConfig
// ---------------------------------------------------------------------------

/// Immutable per-ledger settings.
///
/// ```
/// use ledger_core::config::LedgerConfig;
///
/// let config = LedgerConfig::default().with_difficulty(0).with_lookback(10);
/// assert_eq!(config.difficulty, 0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Number of leading `'0'` hex characters a block hash must carry.
    /// Zero disables proof-of-work.
    pub difficulty: u32,
    /// Version number written into each block header.
    pub version: u32,
    /// How many blocks back from the tip to look for duplicate transactions.
    pub lookback: u64,
    /// Records scanned by the fast path of [`crate::storage::Index::search`].
    pub recent_window: usize,
    /// `previousHash` assigned to the genesis block.
    pub genesis_previous_hash: String,
    /// Pretty-print block files instead of writing compact JSON.
    pub pretty_json: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            version: DEFAULT_VERSION,
            lookback: DEFAULT_LOOKBACK,
            recent_window: DEFAULT_RECENT_WINDOW,
            genesis_previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            pretty_json: false,
        }
    }
}

impl LedgerConfig {
    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_lookback(mut self, lookback: u64) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn with_recent_window(mut self, recent_window: usize) -> Self {
        self.recent_window = recent_window;
        self
    }

    pub fn with_genesis_previous_hash(mut self, hash: impl Into<String>) -> Self {
        self.genesis_previous_hash = hash.into();
        self
    }

    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    /// Reject settings the engine cannot honour.
    ///
    /// A difficulty wider than the digest can never be satisfied and would
    /// spin the miner forever. The genesis sentinel must not contain the
    /// index field separator or a newline, or the index log breaks.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.difficulty as usize > DIGEST_HEX_LENGTH {
            return Err(LedgerError::InvalidArgument(format!(
                "difficulty {} exceeds digest length {}",
                self.difficulty, DIGEST_HEX_LENGTH
            )));
        }
        if self
            .genesis_previous_hash
            .contains(|c: char| c == ',' || c == '\n')
        {
            return Err(LedgerError::InvalidArgument(
                "genesis previous hash may not contain ',' or newlines".to_string(),
            ));
        }
        Ok(())
    }
}
