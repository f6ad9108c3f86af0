//! Proof-of-work admission cost.
//!
//! A block is admissible at difficulty `d` when its hex hash starts with
//! `d` ASCII `'0'` characters. That is a base-16 leading-digit test, not a
//! bit-count threshold: each extra level multiplies the expected work by 16.
//! Mining is a single-threaded brute-force walk over the nonce.

use tracing::trace;

use super::header::BlockHeader;

/// Attempts between `trace!` progress events.
const PROGRESS_INTERVAL: u64 = 1 << 20;

/// Result of a successful mining run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningOutcome {
    /// Hash that satisfied the difficulty target.
    pub hash: String,
    /// Winning nonce.
    pub nonce: u64,
    /// Number of nonce increments it took.
    pub attempts: u64,
}

/// Whether `hash` begins with `difficulty` `'0'` characters.
///
/// Difficulty 0 is always satisfied; a difficulty longer than the hash
/// never is.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let width = difficulty as usize;
    hash.len() >= width && hash.as_bytes()[..width].iter().all(|&b| b == b'0')
}

/// Increment `header.nonce` until the header hash meets `header.difficulty`.
///
/// `hash` is the header's current hash; it is rechecked before the first
/// increment so an already-admissible header is left untouched. The
/// caller is responsible for keeping `difficulty` within the digest width
/// (see [`crate::config::LedgerConfig::validate`]); an impossible target
/// never returns.
pub fn mine(header: &mut BlockHeader, hash: String) -> MiningOutcome {
    let mut hash = hash;
    let mut attempts = 0u64;

    while !meets_difficulty(&hash, header.difficulty) {
        header.nonce += 1;
        hash = header.compute_hash();
        attempts += 1;

        if attempts % PROGRESS_INTERVAL == 0 {
            trace!(
                attempts,
                nonce = header.nonce,
                difficulty = header.difficulty,
                "still mining"
            );
        }
    }

    MiningOutcome {
        hash,
        nonce: header.nonce,
        attempts,
    }
}
