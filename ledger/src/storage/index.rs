//! # Block Index
//!
//! `blockchain.idx` is an append-only log mapping block numbers to block
//! hashes, one record per line:
//!
//! ```text
//! 0,3a7f...c2\n
//! 1,00e1...9b\n
//! 2,0041...7d\n
//! ```
//!
//! Block numbers are dense and strictly increasing, so the last line is
//! always the tip. Records are never edited or removed.
//!
//! ## Lookup Strategy
//!
//! ```text
//! last()      tail read, INDEX_TAIL_BUFFER bytes
//! list(n)     reverse chunked scan, n lines
//! search(h)   (a) reverse scan of the last `recent_window` lines
//!             (b) forward scan of the whole log, only if (a) missed and
//!                 the log is longer than the window
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use super::fs::FileStore;
use crate::block::Block;
use crate::config::{INDEX_FILE_NAME, INDEX_TAIL_BUFFER, REVERSE_SCAN_CHUNK};
use crate::crypto::is_digest;
use crate::error::{LedgerError, LedgerResult};

// ---------------------------------------------------------------------------
// IndexEntry
// ---------------------------------------------------------------------------

/// One `<index>,<hash>` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub index: u64,
    pub hash: String,
}

impl IndexEntry {
    /// The record as written to the log, newline included.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for IndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.index, self.hash)
    }
}

impl FromStr for IndexEntry {
    type Err = LedgerError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || LedgerError::MalformedIndexRecord {
            line: line.to_string(),
        };

        let (index, hash) = line.trim_end().split_once(',').ok_or_else(malformed)?;
        let index = index.parse::<u64>().map_err(|_| malformed())?;
        if !is_digest(hash) {
            return Err(malformed());
        }

        Ok(Self {
            index,
            hash: hash.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Handle on a chain's index log.
#[derive(Debug, Clone)]
pub struct Index {
    store: FileStore,
    path: PathBuf,
    recent_window: usize,
}

impl Index {
    /// Index for the chain stored in `chain_dir`. Nothing is touched on disk
    /// until the first [`Self::add`].
    pub fn new(chain_dir: &Path, recent_window: usize) -> Self {
        Self {
            store: FileStore::new(),
            path: chain_dir.join(INDEX_FILE_NAME),
            recent_window,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.store.exists(&self.path)
    }

    /// Append a record for `block`.
    pub fn add(&self, block: &Block) -> LedgerResult<()> {
        let entry = IndexEntry {
            index: block.index(),
            hash: block.hash().to_string(),
        };
        self.store.append(&self.path, entry.to_line().as_bytes())?;
        Ok(())
    }

    /// Most recent record.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if the log is missing or empty.
    pub fn tip(&self) -> LedgerResult<IndexEntry> {
        self.store
            .read_tail_line(&self.path, INDEX_TAIL_BUFFER)?
            .ok_or_else(|| LedgerError::NotFound(format!("tip of {}", self.path.display())))?
            .parse()
    }

    /// Block number of the most recent record.
    pub fn last(&self) -> LedgerResult<u64> {
        Ok(self.tip()?.index)
    }

    /// The `n` most recent records, most recent first.
    pub fn list(&self, n: usize) -> LedgerResult<Vec<IndexEntry>> {
        self.store
            .reverse_lines(&self.path, Some(n), REVERSE_SCAN_CHUNK)?
            .map(|line| line.map_err(LedgerError::from)?.parse::<IndexEntry>())
            .collect()
    }

    /// Block number recorded for `hash`, if any.
    ///
    /// A `hash` that is not a 64-character hex digest can never be in the
    /// log and returns `None` without touching the disk.
    pub fn search(&self, hash: &str) -> LedgerResult<Option<u64>> {
        if !is_digest(hash) {
            return Ok(None);
        }

        let mut scanned = 0usize;
        for line in self.store.reverse_lines(
            &self.path,
            Some(self.recent_window),
            REVERSE_SCAN_CHUNK,
        )? {
            let entry: IndexEntry = line?.parse()?;
            scanned += 1;
            if entry.hash == hash {
                debug!(hash, index = entry.index, scanned, "index hit in recent window");
                return Ok(Some(entry.index));
            }
        }

        if scanned < self.recent_window {
            // The window already covered the whole log.
            return Ok(None);
        }

        let needle = format!(",{hash}");
        match self.store.search_line_containing(&self.path, &needle)? {
            Some(line) => {
                let entry: IndexEntry = line.parse()?;
                debug!(hash, index = entry.index, "index hit in full scan");
                Ok(Some(entry.index))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::double_hash;
    use std::fs;
    use tempfile::TempDir;

    fn hash_for(i: u64) -> String {
        double_hash(i.to_string())
    }

    /// Index log with `count` records, written directly.
    fn seeded(dir: &TempDir, count: u64, recent_window: usize) -> Index {
        let index = Index::new(dir.path(), recent_window);
        let mut text = String::new();
        for i in 0..count {
            text.push_str(
                &IndexEntry {
                    index: i,
                    hash: hash_for(i),
                }
                .to_line(),
            );
        }
        fs::write(index.path(), text).unwrap();
        index
    }

    #[test]
    fn entry_parses_and_prints() {
        let line = format!("42,{}", hash_for(42));
        let entry: IndexEntry = line.parse().unwrap();
        assert_eq!(entry.index, 42);
        assert_eq!(entry.to_string(), line);
        assert_eq!(entry.to_line(), format!("{line}\n"));
    }

    #[test]
    fn malformed_entries_are_rejected() {
        let negative = format!("-1,{}", hash_for(1));
        for bad in ["", "42", "x,abc", negative.as_str(), "1,nothex"] {
            assert!(
                matches!(
                    bad.parse::<IndexEntry>(),
                    Err(LedgerError::MalformedIndexRecord { .. })
                ),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn last_reads_the_tip() {
        let dir = TempDir::new().unwrap();
        let index = seeded(&dir, 1234, 1000);
        assert_eq!(index.last().unwrap(), 1233);
        assert_eq!(index.tip().unwrap().hash, hash_for(1233));
    }

    #[test]
    fn last_on_missing_log_is_not_found() {
        let dir = TempDir::new().unwrap();
        let index = Index::new(dir.path(), 1000);
        assert!(!index.exists());
        assert!(matches!(index.last(), Err(LedgerError::NotFound(_))));
    }

    #[test]
    fn list_is_most_recent_first() {
        let dir = TempDir::new().unwrap();
        let index = seeded(&dir, 100, 1000);

        let entries = index.list(3).unwrap();
        let numbers: Vec<u64> = entries.iter().map(|e| e.index).collect();
        assert_eq!(numbers, vec![99, 98, 97]);
        assert_eq!(entries[0].hash, hash_for(99));

        assert_eq!(index.list(500).unwrap().len(), 100);
        assert!(index.list(0).unwrap().is_empty());
    }

    #[test]
    fn search_fast_and_slow_paths_agree() {
        let dir = TempDir::new().unwrap();
        let narrow = seeded(&dir, 300, 10);
        let wide = Index::new(dir.path(), 1000);

        // Inside the window of both.
        assert_eq!(narrow.search(&hash_for(295)).unwrap(), Some(295));
        assert_eq!(wide.search(&hash_for(295)).unwrap(), Some(295));

        // Outside the narrow window: found by the forward scan.
        assert_eq!(narrow.search(&hash_for(3)).unwrap(), Some(3));
        assert_eq!(wide.search(&hash_for(3)).unwrap(), Some(3));

        assert_eq!(narrow.search(&hash_for(0)).unwrap(), Some(0));
    }

    #[test]
    fn search_misses() {
        let dir = TempDir::new().unwrap();
        let index = seeded(&dir, 50, 10);
        assert_eq!(index.search(&hash_for(9999)).unwrap(), None);
        assert_eq!(index.search("not-a-hash").unwrap(), None);
        // A prefix of a stored hash is not a digest.
        assert_eq!(index.search(&hash_for(7)[..32]).unwrap(), None);
    }

    #[test]
    fn search_on_missing_log_is_not_found() {
        let dir = TempDir::new().unwrap();
        let index = Index::new(dir.path(), 10);
        let err = index.search(&hash_for(1)).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }
}
