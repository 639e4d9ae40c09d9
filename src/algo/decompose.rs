//! Per-suit block decomposition.
//!
//! A suit's 9 counts are split into melds (runs or triplets), partials
//! (two tiles one draw away from a run) and pairs. Every reachable
//! `(melds, partials, pairs)` triple is kept since the best one depends on
//! what the other suits contribute.

use crate::error::{AnalysisError, Result};
use std::sync::Arc;

use ahash::AHashMap;
use derive_more::{Add, AddAssign, Sum};
use serde::Serialize;
use tinyvec::ArrayVec;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Add, AddAssign, Sum, Serialize)]
pub struct BlockCounts {
    pub melds: u8,
    pub partials: u8,
    pub pairs: u8,
}

impl BlockCounts {
    pub const MELD: Self = Self::new(1, 0, 0);
    pub const PARTIAL: Self = Self::new(0, 1, 0);
    pub const PAIR: Self = Self::new(0, 0, 1);

    #[inline]
    #[must_use]
    pub const fn new(melds: u8, partials: u8, pairs: u8) -> Self {
        Self { melds, partials, pairs }
    }

    /// Tiles consumed by these blocks.
    #[inline]
    #[must_use]
    pub const fn tiles(self) -> u8 {
        self.melds * 3 + (self.partials + self.pairs) * 2
    }
}

/// Base-5 key of a suit vector, `sum(counts[i] * 5^i)`.
#[must_use]
pub fn suit_key(counts: &[u8; 9]) -> u32 {
    counts.iter().rev().fold(0, |acc, &c| acc * 5 + c as u32)
}

/// Memo table from suit keys to their reachable triples.
#[derive(Debug, Default, Clone)]
pub struct SuitTable {
    table: AHashMap<u32, Arc<[BlockCounts]>>,
}

impl SuitTable {
    #[must_use]
    pub fn get(&self, counts: &[u8; 9]) -> Option<Arc<[BlockCounts]>> {
        self.table.get(&suit_key(counts)).cloned()
    }

    /// Sorted, deduplicated triples reachable from `counts`. Every count must
    /// be at most 4.
    pub fn blocks(&mut self, counts: [u8; 9]) -> Arc<[BlockCounts]> {
        debug_assert!(counts.iter().all(|&c| c <= 4));
        let key = suit_key(&counts);
        if let Some(found) = self.table.get(&key) {
            return Arc::clone(found);
        }

        let ret: Arc<[BlockCounts]> = match counts.iter().position(|&c| c > 0) {
            None => Arc::new([BlockCounts::default()]),
            Some(first) => {
                let mut found = vec![];
                for (next, delta) in branches(&counts, first) {
                    found.extend(self.blocks(next).iter().map(|&b| b + delta));
                }
                found.sort_unstable();
                found.dedup();
                found.into()
            }
        };
        self.table.insert(key, Arc::clone(&ret));
        ret
    }

    /// Merge entries computed elsewhere.
    pub fn extend(&mut self, other: SuitTable) {
        self.table.extend(other.table);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}

/// The mutually exclusive ways to consume the tile at `first`, each as the
/// remaining vector and the block it formed.
fn branches(counts: &[u8; 9], first: usize) -> ArrayVec<[([u8; 9], BlockCounts); 6]> {
    let mut ret = ArrayVec::new();
    let mut take = |offsets: &[usize], delta: BlockCounts| {
        let mut next = *counts;
        for &off in offsets {
            next[first + off] -= 1;
        }
        ret.push((next, delta));
    };

    let c = counts[first];
    if c >= 3 {
        take(&[0, 0, 0], BlockCounts::MELD);
    }
    if first <= 6 && counts[first + 1] > 0 && counts[first + 2] > 0 {
        take(&[0, 1, 2], BlockCounts::MELD);
    }
    if c >= 2 {
        take(&[0, 0], BlockCounts::PAIR);
    }
    if first <= 7 && counts[first + 1] > 0 {
        take(&[0, 1], BlockCounts::PARTIAL);
    }
    if first <= 6 && counts[first + 2] > 0 {
        take(&[0, 2], BlockCounts::PARTIAL);
    }
    take(&[0], BlockCounts::default());

    ret
}

/// Every triple reachable from one suit, computed without a shared table.
pub fn decompose_suit(counts: &[u8; 9]) -> Result<Vec<BlockCounts>> {
    if let Some(&c) = counts.iter().find(|&&c| c > 4) {
        return Err(AnalysisError::InvalidHandState(format!(
            "{c} copies of one kind in {counts:?}"
        )));
    }
    Ok(SuitTable::default().blocks(*counts).to_vec())
}

/// Honors never form runs or partials, so each kind is solved in closed form.
#[must_use]
pub fn decompose_honors(counts: &[u8]) -> BlockCounts {
    counts
        .iter()
        .map(|&c| BlockCounts::new(c / 3, 0, (c % 3 == 2) as u8))
        .sum()
}
