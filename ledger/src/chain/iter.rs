//! Lazy range iteration over stored blocks.

use std::ops::RangeInclusive;

use super::ledger::Ledger;
use crate::block::Block;
use crate::error::LedgerResult;

/// Range and direction for [`Ledger::all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllOptions {
    /// First block number of the range.
    pub start: u64,
    /// Last block number of the range, inclusive. `None` means the tip.
    pub finish: Option<u64>,
    /// Newest first when `true`.
    pub reverse: bool,
}

impl Default for AllOptions {
    fn default() -> Self {
        Self {
            start: 0,
            finish: None,
            reverse: true,
        }
    }
}

impl AllOptions {
    pub fn range(start: u64, finish: u64) -> Self {
        Self {
            start,
            finish: Some(finish),
            ..Self::default()
        }
    }

    /// Oldest first.
    pub fn ascending(mut self) -> Self {
        self.reverse = false;
        self
    }
}

/// Iterator returned by [`Ledger::all`].
///
/// Each call to `next` reads and verifies one block file; nothing is held
/// open between calls. Dropping it early is the way to stop.
#[derive(Debug)]
pub struct Blocks<'a> {
    ledger: &'a Ledger,
    range: RangeInclusive<u64>,
    reverse: bool,
}

impl<'a> Blocks<'a> {
    pub(super) fn new(ledger: &'a Ledger, range: RangeInclusive<u64>, reverse: bool) -> Self {
        Self {
            ledger,
            range,
            reverse,
        }
    }
}

impl Iterator for Blocks<'_> {
    type Item = LedgerResult<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = if self.reverse {
            self.range.next_back()?
        } else {
            self.range.next()?
        };
        Some(self.ledger.get(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}
