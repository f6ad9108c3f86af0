//! # FileStore: locked, byte-level file access
//!
//! Every operation takes an fs2 advisory lock on the file it touches and
//! holds it for that single operation only:
//!
//! | Operation                  | Lock      |
//! |----------------------------|-----------|
//! | `read`, `read_tail`        | shared    |
//! | `search_line_containing`   | shared    |
//! | `reverse_lines`            | shared, for the iterator's lifetime |
//! | `write`, `append`          | exclusive |
//!
//! There is no cross-operation transaction. Two calls are two lock
//! acquisitions.
//!
//! ## Reverse Line Scan
//!
//! ```text
//!   file:  ....\nline 7\nline 8\nline 9\n
//!                         ◀── chunk ──┤
//!   carry = bytes before the first '\n' of the chunk (an incomplete line)
//!   lines after that '\n' are complete and yielded newest first
//! ```
//!
//! Tail queries therefore cost O(lines wanted), not O(file size).

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors raised by [`FileStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The file does not exist.
    #[error("{} does not exist", path.display())]
    NotFound { path: PathBuf },

    /// Open, seek, read or write failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The advisory lock could not be taken.
    #[error("could not lock {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| {
        if source.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            StorageError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

fn lock_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Lock {
        path: path.to_path_buf(),
        source,
    }
}

fn open_shared(path: &Path) -> StorageResult<File> {
    let file = File::open(path).map_err(io_error(path))?;
    FileExt::lock_shared(&file).map_err(lock_error(path))?;
    Ok(file)
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// Stateless handle over the filesystem. Locks are released when the
/// underlying file handle is closed at the end of each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStore;

impl FileStore {
    pub fn new() -> Self {
        Self
    }

    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Whole file as UTF-8 text.
    pub fn read(&self, path: &Path) -> StorageResult<String> {
        let mut file = open_shared(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(io_error(path))?;
        Ok(contents)
    }

    /// Replace the file's contents, optionally creating missing parent
    /// directories first.
    ///
    /// The file is truncated only once the exclusive lock is held.
    pub fn write(&self, path: &Path, contents: &[u8], create_dirs: bool) -> StorageResult<()> {
        if create_dirs {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(io_error(parent))?;
            }
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(io_error(path))?;
        FileExt::lock_exclusive(&file).map_err(lock_error(path))?;

        file.set_len(0).map_err(io_error(path))?;
        file.write_all(contents).map_err(io_error(path))?;
        file.flush().map_err(io_error(path))?;
        Ok(())
    }

    /// Append to the file, creating it if needed.
    pub fn append(&self, path: &Path, contents: &[u8]) -> StorageResult<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(io_error(path))?;
        FileExt::lock_exclusive(&file).map_err(lock_error(path))?;

        file.write_all(contents).map_err(io_error(path))?;
        file.flush().map_err(io_error(path))?;
        Ok(())
    }

    /// First line (without its newline) containing `needle`, scanning
    /// forward from the start of the file.
    pub fn search_line_containing(
        &self,
        path: &Path,
        needle: &str,
    ) -> StorageResult<Option<String>> {
        let reader = BufReader::new(open_shared(path)?);
        for line in reader.lines() {
            let line = line.map_err(io_error(path))?;
            if line.contains(needle) {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    /// The last `buffer` bytes of the file (or all of it, if shorter).
    pub fn read_tail(&self, path: &Path, buffer: usize) -> StorageResult<String> {
        let mut file = open_shared(path)?;
        let len = file.metadata().map_err(io_error(path))?.len();
        let start = len.saturating_sub(buffer as u64);

        file.seek(SeekFrom::Start(start)).map_err(io_error(path))?;
        let mut bytes = Vec::with_capacity((len - start) as usize);
        file.read_to_end(&mut bytes).map_err(io_error(path))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Last non-empty line within the trailing `buffer` bytes.
    ///
    /// Returns `None` for an empty file. The caller must size `buffer` so
    /// that at least one full record always fits.
    pub fn read_tail_line(&self, path: &Path, buffer: usize) -> StorageResult<Option<String>> {
        let tail = self.read_tail(path, buffer)?;
        Ok(tail
            .lines()
            .rev()
            .find(|line| !line.is_empty())
            .map(str::to_string))
    }

    /// Lines of the file from newest to oldest, read backwards in `chunk`
    /// sized pieces. Blank lines are skipped. `max_lines` caps the number
    /// of lines yielded.
    pub fn reverse_lines(
        &self,
        path: &Path,
        max_lines: Option<usize>,
        chunk: usize,
    ) -> StorageResult<ReverseLines> {
        let file = open_shared(path)?;
        let position = file.metadata().map_err(io_error(path))?.len();

        Ok(ReverseLines {
            file,
            path: path.to_path_buf(),
            position,
            chunk: chunk.max(1),
            carry: Vec::new(),
            pending: VecDeque::new(),
            remaining: max_lines,
            done: false,
        })
    }
}

// ---------------------------------------------------------------------------
// ReverseLines
// ---------------------------------------------------------------------------

/// Iterator returned by [`FileStore::reverse_lines`].
///
/// Holds a shared lock on the file until dropped. Not restartable: once it
/// returns `None` (or an error) it stays exhausted.
#[derive(Debug)]
pub struct ReverseLines {
    file: File,
    path: PathBuf,
    /// Bytes of the file not yet read, counted from the start.
    position: u64,
    chunk: usize,
    /// Incomplete line carried over from the previous chunk.
    carry: Vec<u8>,
    /// Complete lines from the current chunk, newest first.
    pending: VecDeque<String>,
    remaining: Option<usize>,
    done: bool,
}

impl ReverseLines {
    fn read_chunk(&mut self) -> io::Result<()> {
        let size = (self.chunk as u64).min(self.position);
        self.position -= size;

        let mut bytes = vec![0u8; size as usize];
        self.file.seek(SeekFrom::Start(self.position))?;
        self.file.read_exact(&mut bytes)?;
        bytes.extend_from_slice(&self.carry);

        match bytes.iter().position(|&b| b == b'\n') {
            None => self.carry = bytes,
            Some(first) => {
                for segment in bytes[first + 1..].split(|&b| b == b'\n').rev() {
                    if !segment.is_empty() {
                        self.pending
                            .push_back(String::from_utf8_lossy(segment).into_owned());
                    }
                }
                bytes.truncate(first);
                self.carry = bytes;
            }
        }
        Ok(())
    }
}

impl Iterator for ReverseLines {
    type Item = StorageResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.remaining == Some(0) {
                return None;
            }

            if let Some(line) = self.pending.pop_front() {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                return Some(Ok(line));
            }

            if self.position == 0 {
                // The first line of the file has no newline before it.
                if self.carry.is_empty() {
                    self.done = true;
                    return None;
                }
                let first = std::mem::take(&mut self.carry);
                self.pending
                    .push_back(String::from_utf8_lossy(&first).into_owned());
                continue;
            }

            if let Err(e) = self.read_chunk() {
                self.done = true;
                return Some(Err(io_error(&self.path)(e)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lines_file(dir: &TempDir, count: usize) -> PathBuf {
        let path = dir.path().join("lines.txt");
        let mut text = String::new();
        for i in 0..count {
            text.push_str(&format!("{},{}\n", i, "a".repeat(i % 7)));
        }
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn write_creates_directories_and_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("0").join("1.json");
        let store = FileStore::new();

        store.write(&path, b"first version", true).unwrap();
        store.write(&path, b"second", false).unwrap();
        assert_eq!(store.read(&path).unwrap(), "second");
        assert!(store.exists(&path));
    }

    #[test]
    fn write_without_create_dirs_fails_on_missing_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("1.json");
        assert!(FileStore::new().write(&path, b"x", false).is_err());
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = FileStore::new()
            .read(&dir.path().join("nope.json"))
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn append_accumulates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log");
        let store = FileStore::new();
        store.append(&path, b"a\n").unwrap();
        store.append(&path, b"b\n").unwrap();
        assert_eq!(store.read(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn search_line_containing_returns_first_match() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log");
        fs::write(&path, "1,abc\n2,def\n3,abcdef\n").unwrap();
        let store = FileStore::new();

        assert_eq!(
            store.search_line_containing(&path, "abc").unwrap().as_deref(),
            Some("1,abc")
        );
        assert_eq!(store.search_line_containing(&path, "xyz").unwrap(), None);
    }

    #[test]
    fn tail_line_reads_final_record_only() {
        let dir = TempDir::new().unwrap();
        let path = lines_file(&dir, 500);
        let store = FileStore::new();

        assert_eq!(
            store.read_tail_line(&path, 32).unwrap().as_deref(),
            Some("499,aa")
        );
        assert_eq!(store.read_tail(&path, 4).unwrap(), ",aa\n");
    }

    #[test]
    fn tail_line_of_empty_file_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty");
        fs::write(&path, "").unwrap();
        assert_eq!(FileStore::new().read_tail_line(&path, 64).unwrap(), None);
    }

    #[test]
    fn reverse_lines_yields_newest_first_across_chunks() {
        let dir = TempDir::new().unwrap();
        let path = lines_file(&dir, 200);
        let store = FileStore::new();

        // A chunk smaller than a single line forces lines to span chunks.
        for chunk in [3, 7, 64, 4096] {
            let lines: Vec<String> = store
                .reverse_lines(&path, None, chunk)
                .unwrap()
                .collect::<StorageResult<_>>()
                .unwrap();
            assert_eq!(lines.len(), 200, "chunk {chunk}");
            assert_eq!(lines[0], "199,aaa");
            assert_eq!(lines[199], "0,");
            assert!(lines
                .iter()
                .zip((0..200).rev())
                .all(|(line, i)| line.starts_with(&format!("{i},"))));
        }
    }

    #[test]
    fn reverse_lines_respects_limit() {
        let dir = TempDir::new().unwrap();
        let path = lines_file(&dir, 50);
        let lines: Vec<String> = FileStore::new()
            .reverse_lines(&path, Some(3), 16)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(lines, vec!["49,", "48,aaaaaa", "47,aaaaa"]);
    }

    #[test]
    fn reverse_lines_handles_missing_trailing_newline_and_blanks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log");
        fs::write(&path, "first\n\nsecond\nthird").unwrap();
        let lines: Vec<String> = FileStore::new()
            .reverse_lines(&path, None, 5)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(lines, vec!["third", "second", "first"]);
    }

    #[test]
    fn reverse_lines_on_empty_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log");
        fs::write(&path, "").unwrap();
        assert_eq!(
            FileStore::new()
                .reverse_lines(&path, None, 8)
                .unwrap()
                .count(),
            0
        );
    }
}
