use crate::algo::decompose::{BlockCounts, SuitTable};
use crate::algo::shanten::ShapeKind;
use crate::hand::Hand;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::Serialize;

/// Memoization shared by every call of an [`Analyzer`](crate::Analyzer).
///
/// Holds the per-suit decomposition table and finished shanten values per
/// `(hand, shape)`. Entries are pure functions of their keys, so the cache can
/// be shared between analyzers and cleared at any time.
///
/// Nothing is evicted. The suit table is bounded by the number of suit
/// vectors, but the hand map gains an entry for every distinct hand and shape
/// seen. Long runs over many hands should call [`clear_hands`](Self::clear_hands)
/// or [`clear`](Self::clear) now and then.
#[derive(Debug, Default)]
pub struct ShantenCache {
    suits: RwLock<SuitTable>,
    hands: RwLock<AHashMap<(u128, ShapeKind), i8>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub suit_entries: usize,
    pub hand_entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl ShantenCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suit_blocks(&self, counts: [u8; 9]) -> Arc<[BlockCounts]> {
        if let Some(found) = self.suits.read().get(&counts) {
            return found;
        }
        // search without holding the lock, then publish everything it visited
        let mut local = SuitTable::default();
        let ret = local.blocks(counts);
        self.suits.write().extend(local);
        ret
    }

    /// Cached shanten of `hand` for `shape`, running `compute` on a miss.
    pub fn shanten(&self, hand: &Hand, shape: ShapeKind, compute: impl FnOnce() -> i8) -> i8 {
        let key = (hand.key(), shape);
        if let Some(&found) = self.hands.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return found;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let ret = compute();
        self.hands.write().insert(key, ret);
        ret
    }

    /// Drops the per-hand shanten values and keeps the suit table.
    pub fn clear_hands(&self) {
        self.hands.write().clear();
    }

    pub fn clear(&self) {
        self.suits.write().clear();
        self.hands.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            suit_entries: self.suits.read().len(),
            hand_entries: self.hands.read().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hit_and_clear() {
        let cache = ShantenCache::new();
        let hand: Hand = "123456789m 1123p".parse().unwrap();
        assert_eq!(cache.shanten(&hand, ShapeKind::Standard, || 0), 0);
        // a hit never runs the computation again
        assert_eq!(cache.shanten(&hand, ShapeKind::Standard, || unreachable!()), 0);
        assert_eq!(cache.shanten(&hand, ShapeKind::SevenPairs, || 4), 4);

        let blocks = cache.suit_blocks([1, 1, 1, 0, 0, 0, 0, 0, 0]);
        assert!(blocks.contains(&BlockCounts::MELD));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hand_entries, 2);
        assert!(stats.suit_entries > 1);

        let suit_entries = stats.suit_entries;
        cache.clear_hands();
        let stats = cache.stats();
        assert_eq!((stats.suit_entries, stats.hand_entries), (suit_entries, 0));
        assert_eq!(cache.shanten(&hand, ShapeKind::Standard, || 1), 1);

        cache.clear();
        let stats = cache.stats();
        assert_eq!((stats.suit_entries, stats.hand_entries, stats.hits), (0, 0, 0));
    }
}
