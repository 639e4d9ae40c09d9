//! Shanten for the three winning shapes.
//!
//! Shanten is the number of tile exchanges away from tenpai: `0` is tenpai
//! and `-1` a complete hand.

use super::decompose::{BlockCounts, decompose_honors};
use crate::error::{AnalysisError, Result};
use crate::hand::Hand;
use crate::tile::{NUM_KINDS, Suit, Tile};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Worst possible standard shanten.
pub const MAX_STANDARD_SHANTEN: i8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    /// Four melds and a pair.
    Standard,
    /// Seven distinct pairs.
    SevenPairs,
    /// One of each terminal and honor plus a pair of one of them.
    ThirteenOrphans,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Standard, ShapeKind::SevenPairs, ShapeKind::ThirteenOrphans];

    #[inline]
    #[must_use]
    pub const fn needs_closed(self) -> bool {
        !matches!(self, ShapeKind::Standard)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Standard => "standard",
            ShapeKind::SevenPairs => "seven-pairs",
            ShapeKind::ThirteenOrphans => "thirteen-orphans",
        }
    }

    /// Fails for the closed-only shapes when melds are exposed.
    pub fn check_legal(self, hand: &Hand) -> Result<()> {
        if self.needs_closed() && hand.exposed_melds() > 0 {
            Err(AnalysisError::InvalidShapeKind {
                shape: self,
                exposed_melds: hand.exposed_melds(),
            })
        } else {
            Ok(())
        }
    }

    /// Shapes reachable by `hand`, standard first.
    pub fn legal_for(hand: &Hand) -> impl Iterator<Item = ShapeKind> + '_ {
        Self::ALL.into_iter().filter(|shape| !shape.needs_closed() || hand.exposed_melds() == 0)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ShapeKind::ALL
            .into_iter()
            .find(|shape| shape.as_str() == s)
            .ok_or_else(|| format!("unknown shape \"{s}\""))
    }
}

/// Standard shanten of one combination of blocks, exposed melds included in
/// `melds`. Never negative; completeness is decided by the caller.
#[must_use]
pub const fn block_shanten(melds: u8, partials: u8, pairs: u8) -> i8 {
    let m = melds as i8;
    let blocks = (partials + pairs) as i8;
    let usable = if blocks < 4 - m { blocks } else { 4 - m };
    let mut shanten = MAX_STANDARD_SHANTEN - 2 * m - usable;
    if pairs >= 1 && m + blocks >= 5 {
        shanten -= 1;
    }
    if shanten < 0 { 0 } else { shanten }
}

/// Standard shanten, with suit decompositions supplied by `blocks`.
pub fn standard_with(hand: &Hand, mut blocks: impl FnMut([u8; 9]) -> Arc<[BlockCounts]>) -> i8 {
    let held = hand.held();
    let exposed = hand.exposed_melds();
    let honors = decompose_honors(hand.honor_counts());
    let [man, pin, sou] = Suit::ALL.map(|suit| blocks(hand.suit_counts(suit)));

    let mut best = MAX_STANDARD_SHANTEN;
    for &m in man.iter() {
        for &p in pin.iter() {
            for &s in sou.iter() {
                let total = m + p + s + honors;
                let melds = total.melds + exposed;
                if melds == 4 && total.pairs == 1 && total.partials == 0 && total.tiles() == held {
                    return -1;
                }
                best = best.min(block_shanten(melds, total.partials, total.pairs));
            }
        }
    }
    best
}

#[must_use]
pub fn seven_pairs(counts: &[u8; NUM_KINDS]) -> i8 {
    let pairs = counts.iter().filter(|&&c| c >= 2).count() as i8;
    let kinds = counts.iter().filter(|&&c| c > 0).count() as i8;
    if pairs == 7 {
        return -1;
    }
    6 - pairs + (7 - kinds).max(0)
}

#[must_use]
pub fn thirteen_orphans(counts: &[u8; NUM_KINDS]) -> i8 {
    let (types, has_pair) = Tile::all()
        .filter(|tile| tile.is_orphan())
        .map(|tile| counts[tile.as_usize()])
        .fold((0_i8, false), |(types, has_pair), c| (types + (c > 0) as i8, has_pair || c >= 2));
    match (types, has_pair) {
        (13, true) => -1,
        (_, true) => 12 - types,
        _ => 13 - types,
    }
}
