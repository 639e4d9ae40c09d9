use crate::algo::decompose::SuitTable;
use crate::algo::shanten::{self, ShapeKind};
use crate::algo::ukeire::{UkeireMap, ukeire_with};
use crate::cache::ShantenCache;
use crate::error::{AnalysisError, Result};
use crate::hand::{Hand, count_tiles};
use crate::tile::{NUM_KINDS, Suit, Tile};
use std::sync::Arc;

/// Entry point of every analysis.
///
/// An analyzer is cheap to clone and safe to share between threads. Results
/// never depend on whether a cache is attached or on what it already holds.
#[derive(Debug, Clone)]
pub struct Analyzer {
    cache: Option<Arc<ShantenCache>>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    /// An analyzer with its own cache.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cache(Arc::new(ShantenCache::new()))
    }

    #[must_use]
    pub fn with_cache(cache: Arc<ShantenCache>) -> Self {
        Self { cache: Some(cache) }
    }

    /// An analyzer that recomputes everything on every call.
    #[must_use]
    pub const fn uncached() -> Self {
        Self { cache: None }
    }

    #[must_use]
    pub fn cache(&self) -> Option<&ShantenCache> {
        self.cache.as_deref()
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Shanten of a 13 or 14 sized hand for one shape.
    pub fn shanten(&self, hand: &Hand, shape: ShapeKind) -> Result<i8> {
        hand.check_size()?;
        shape.check_legal(hand)?;
        Ok(self.shanten_unchecked(hand, shape))
    }

    /// Lowest shanten over the shapes the hand can still reach, and the shape
    /// reaching it. Ties keep the earlier shape of [`ShapeKind::ALL`].
    pub fn min_shanten(&self, hand: &Hand) -> Result<(i8, ShapeKind)> {
        hand.check_size()?;
        Ok(self.min_shanten_unchecked(hand))
    }

    /// Ukeire of a 13 sized hand.
    ///
    /// `visible` lists every copy seen outside this hand (discards, exposed
    /// melds, dora indicators).
    pub fn ukeire(&self, hand: &Hand, excluded: Option<Suit>, visible: &[Tile], shape: ShapeKind) -> Result<UkeireMap> {
        hand.require_size(13)?;
        shape.check_legal(hand)?;
        let visible = visible_counts(hand, visible)?;
        let current = self.shanten_unchecked(hand, shape);
        Ok(self.ukeire_unchecked(hand, excluded, &visible, shape, current))
    }

    /// No size check. Also used for the reduced hands of the advice helpers.
    pub(crate) fn shanten_unchecked(&self, hand: &Hand, shape: ShapeKind) -> i8 {
        let compute = || match shape {
            ShapeKind::Standard => self.standard(hand),
            ShapeKind::SevenPairs => shanten::seven_pairs(hand.counts()),
            ShapeKind::ThirteenOrphans => shanten::thirteen_orphans(hand.counts()),
        };
        match &self.cache {
            Some(cache) => cache.shanten(hand, shape, compute),
            None => compute(),
        }
    }

    pub(crate) fn min_shanten_unchecked(&self, hand: &Hand) -> (i8, ShapeKind) {
        ShapeKind::legal_for(hand)
            .map(|shape| (self.shanten_unchecked(hand, shape), shape))
            .fold((i8::MAX, ShapeKind::Standard), |best, cur| if cur.0 < best.0 { cur } else { best })
    }

    pub(crate) fn ukeire_unchecked(
        &self,
        hand: &Hand,
        excluded: Option<Suit>,
        visible: &[u8; NUM_KINDS],
        shape: ShapeKind,
        current: i8,
    ) -> UkeireMap {
        ukeire_with(hand, excluded, visible, current, |drawn| self.shanten_unchecked(drawn, shape))
    }

    fn standard(&self, hand: &Hand) -> i8 {
        match &self.cache {
            Some(cache) => shanten::standard_with(hand, |v| cache.suit_blocks(v)),
            None => {
                let mut table = SuitTable::default();
                shanten::standard_with(hand, |v| table.blocks(v))
            }
        }
    }
}

/// Counts of `visible`, checked against what `hand` holds.
pub(crate) fn visible_counts(hand: &Hand, visible: &[Tile]) -> Result<[u8; NUM_KINDS]> {
    let counts = count_tiles(visible);
    if let Some(tile) = Tile::all().find(|&tile| counts[tile.as_usize()] > 4) {
        return Err(AnalysisError::InvalidHandState(format!(
            "{} visible copies of {tile}",
            counts[tile.as_usize()]
        )));
    }
    hand.check_visible(&counts)?;
    Ok(counts)
}
