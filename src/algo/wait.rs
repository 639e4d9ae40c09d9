//! Classification of tenpai waits and one-shanten shapes.

use super::decompose::{BlockCounts, SuitTable};
use super::shanten::{ShapeKind, block_shanten, standard_with, thirteen_orphans};
use super::ukeire::UkeireMap;
use crate::analyzer::Analyzer;
use crate::error::{AnalysisError, Result};
use crate::hand::Hand;
use crate::tile::{NUM_KINDS, NUM_NUMBERED, Suit, Tile};
use std::fmt;

use serde::{Deserialize, Serialize};
use tinyvec::ArrayVec;

const NINE_GATES: [u8; 9] = [3, 1, 1, 1, 1, 1, 1, 1, 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaitPattern {
    /// 12 waiting on 3, or 89 waiting on 7
    Edge,
    /// 13 waiting on 2
    Closed,
    /// single tile waiting on its pair
    Pair,
    /// two pairs waiting on either to become a triplet
    DualPair,
    /// 23 waiting on 1 or 4
    TwoSided,
    /// three or more kinds
    MultiSided,
    ThirteenOrphans,
    NineGates,
    /// every waited copy is already visible
    NoWait,
}

impl WaitPattern {
    #[must_use]
    pub const fn to_acronym(self) -> &'static str {
        match self {
            WaitPattern::Edge => "EDG",
            WaitPattern::Closed => "CLS",
            WaitPattern::Pair => "PR",
            WaitPattern::DualPair => "DPR",
            WaitPattern::TwoSided => "TWO",
            WaitPattern::MultiSided => "MLT",
            WaitPattern::ThirteenOrphans => "13O",
            WaitPattern::NineGates => "9G",
            WaitPattern::NoWait => "-",
        }
    }

    /// Waits on three or more kinds by construction.
    #[must_use]
    pub const fn is_multi_sided(self) -> bool {
        matches!(
            self,
            WaitPattern::MultiSided | WaitPattern::ThirteenOrphans | WaitPattern::NineGates
        )
    }

    /// Waits that can only complete on a single kind.
    #[must_use]
    pub const fn is_single(self) -> bool {
        matches!(
            self,
            WaitPattern::Edge | WaitPattern::Closed | WaitPattern::Pair | WaitPattern::NoWait
        )
    }
}

impl fmt::Display for WaitPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_acronym())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OneShantenShape {
    /// Two melds, a pair, two more blocks and an isolated tile.
    SurplusTile,
    /// Two melds, a pair, two more blocks and a tile that still connects.
    Complete,
    /// Three melds and no pair.
    Headless,
    /// Three melds, a pair and two floating tiles.
    DoubleFloat,
    SevenPairs,
    /// Standard and seven pairs are both one away.
    Hybrid,
    ThirteenOrphans,
}

impl OneShantenShape {
    /// Score of the shape for the lookahead refinement.
    #[must_use]
    pub const fn bonus(self) -> f32 {
        match self {
            OneShantenShape::SurplusTile => 10.0,
            OneShantenShape::Complete => 20.0,
            OneShantenShape::Headless => 30.0,
            OneShantenShape::DoubleFloat => 40.0,
            OneShantenShape::SevenPairs => 10.0,
            OneShantenShape::Hybrid => 20.0,
            OneShantenShape::ThirteenOrphans => 10.0,
        }
    }
}

impl Analyzer {
    /// Wait of a 13 sized tenpai hand, given its ukeire.
    pub fn classify_wait(&self, hand: &Hand, ukeire: &UkeireMap) -> Result<WaitPattern> {
        hand.require_size(13)?;
        match self.min_shanten_unchecked(hand) {
            (0, _) => Ok(wait_pattern(hand, ukeire)),
            (shanten, _) => Err(AnalysisError::InvalidHandState(format!("{hand} is not tenpai (shanten {shanten})"))),
        }
    }

    /// Shape of a 13 sized hand at one shanten.
    pub fn classify_one_shanten(&self, hand: &Hand) -> Result<OneShantenShape> {
        hand.require_size(13)?;
        self.one_shanten_shape(hand).ok_or_else(|| {
            AnalysisError::InvalidHandState(format!(
                "{hand} is not one-shanten (shanten {})",
                self.min_shanten_unchecked(hand).0
            ))
        })
    }

    /// `None` unless the lowest shanten over the legal shapes is 1.
    pub(crate) fn one_shanten_shape(&self, hand: &Hand) -> Option<OneShantenShape> {
        let closed_only = |shape| {
            if hand.exposed_melds() == 0 {
                self.shanten_unchecked(hand, shape)
            } else {
                i8::MAX
            }
        };
        let standard = self.shanten_unchecked(hand, ShapeKind::Standard);
        let pairs = closed_only(ShapeKind::SevenPairs);
        let orphans = closed_only(ShapeKind::ThirteenOrphans);
        if standard.min(pairs).min(orphans) != 1 {
            return None;
        }

        Some(match (standard, pairs, orphans) {
            (1, 1, _) => OneShantenShape::Hybrid,
            (1, _, _) => standard_shape(hand),
            (_, 1, _) => OneShantenShape::SevenPairs,
            _ => OneShantenShape::ThirteenOrphans,
        })
    }
}

/// Assumes `hand` is tenpai.
pub(crate) fn wait_pattern(hand: &Hand, ukeire: &UkeireMap) -> WaitPattern {
    let counts = hand.counts();
    if hand.exposed_melds() == 0 {
        if Tile::all().all(|tile| hand.count(tile) == 0 || tile.is_orphan()) && thirteen_orphans(counts) == 0 {
            return WaitPattern::ThirteenOrphans;
        }
        if Suit::ALL.iter().any(|&suit| hand.suit_counts(suit) == NINE_GATES) {
            return WaitPattern::NineGates;
        }
    }

    let held = |tile: Option<Tile>| tile.is_some_and(|tile| hand.count(tile) > 0);
    let waits = ukeire.tiles().collect::<Vec<_>>();
    match waits.as_slice() {
        [] => WaitPattern::NoWait,
        &[tile] => match tile.rank() {
            None => WaitPattern::Pair,
            Some(3) if completes_run(hand, [tile.offset(-2), tile.offset(-1)]) => WaitPattern::Edge,
            Some(7) if completes_run(hand, [tile.offset(1), tile.offset(2)]) => WaitPattern::Edge,
            Some(_) if completes_run(hand, [tile.offset(-1), tile.offset(1)]) => WaitPattern::Closed,
            Some(_) => WaitPattern::Pair,
        },
        &[a, b] => {
            if a.is_honor() || b.is_honor() || (hand.count(a) >= 2 && hand.count(b) >= 2) {
                WaitPattern::DualPair
            } else if a.suit() == b.suit() && a.as_u8().abs_diff(b.as_u8()) == 3 && held(Some(a)) && held(Some(b)) {
                WaitPattern::DualPair
            } else {
                WaitPattern::TwoSided
            }
        }
        _ => WaitPattern::MultiSided,
    }
}

/// Whether `hand` reads as complete melds and a pair once the two `partial`
/// tiles are set aside as the run the wait finishes.
fn completes_run(hand: &Hand, partial: [Option<Tile>; 2]) -> bool {
    let mut counts = *hand.counts();
    for tile in partial {
        let Some(count) = tile.and_then(|t| counts.get_mut(t.as_usize())).filter(|c| **c > 0) else {
            return false;
        };
        *count -= 1;
    }
    Hand::new(counts, hand.exposed_melds() + 1).is_ok_and(|rest| {
        let mut table = SuitTable::default();
        standard_with(&rest, |c| table.blocks(c)) == -1
    })
}

/// One standard reading: blocks taken from the held tiles and the tiles left
/// over. Readings with more than two leftovers are never one-shanten.
#[derive(Debug, Clone, Default)]
struct Reading {
    blocks: BlockCounts,
    leftovers: ArrayVec<[u8; 2]>,
}

fn collect_readings(counts: [u8; NUM_KINDS], acc: Reading, out: &mut Vec<Reading>) {
    let Some(first) = counts.iter().position(|&c| c > 0) else {
        out.push(acc);
        return;
    };
    let numbered = first < NUM_NUMBERED;
    let pos = first % 9;
    let mut branch = |offsets: &[usize], delta: BlockCounts| {
        let mut next = counts;
        for &off in offsets {
            next[first + off] -= 1;
        }
        collect_readings(
            next,
            Reading {
                blocks: acc.blocks + delta,
                leftovers: acc.leftovers.clone(),
            },
            out,
        );
    };

    if counts[first] >= 3 {
        branch(&[0, 0, 0], BlockCounts::MELD);
    }
    if numbered && pos <= 6 && counts[first + 1] > 0 && counts[first + 2] > 0 {
        branch(&[0, 1, 2], BlockCounts::MELD);
    }
    if counts[first] >= 2 {
        branch(&[0, 0], BlockCounts::PAIR);
    }
    if numbered && pos <= 7 && counts[first + 1] > 0 {
        branch(&[0, 1], BlockCounts::PARTIAL);
    }
    if numbered && pos <= 6 && counts[first + 2] > 0 {
        branch(&[0, 2], BlockCounts::PARTIAL);
    }
    if acc.leftovers.len() < acc.leftovers.capacity() {
        let mut next = counts;
        next[first] -= 1;
        let mut leftovers = acc.leftovers.clone();
        leftovers.push(first as u8);
        collect_readings(
            next,
            Reading {
                blocks: acc.blocks,
                leftovers,
            },
            out,
        );
    }
}

/// A leftover still connects when another held tile of its suit is within
/// two ranks, or when it is one of several copies.
fn connects(counts: &[u8; NUM_KINDS], tile: Tile) -> bool {
    counts[tile.as_usize()] >= 2
        || [-2, -1, 1, 2]
            .into_iter()
            .filter_map(|delta| tile.offset(delta))
            .any(|near| counts[near.as_usize()] > 0)
}

fn reading_shape(counts: &[u8; NUM_KINDS], exposed: u8, reading: &Reading) -> OneShantenShape {
    let BlockCounts { melds, partials, pairs } = reading.blocks;
    match (melds + exposed, partials, pairs) {
        (3, 0, 1) => OneShantenShape::DoubleFloat,
        (3, _, 0) => OneShantenShape::Headless,
        (2, _, 1..) if partials + pairs >= 3 => match reading.leftovers.as_slice() {
            &[tile] if connects(counts, Tile::new_unchecked(tile)) => OneShantenShape::Complete,
            _ => OneShantenShape::SurplusTile,
        },
        _ => OneShantenShape::SurplusTile,
    }
}

/// Best valued shape over every standard reading at one shanten.
fn standard_shape(hand: &Hand) -> OneShantenShape {
    let mut readings = vec![];
    collect_readings(*hand.counts(), Reading::default(), &mut readings);
    let exposed = hand.exposed_melds();
    readings
        .iter()
        .filter(|r| block_shanten(r.blocks.melds + exposed, r.blocks.partials, r.blocks.pairs) == 1)
        .map(|r| reading_shape(hand.counts(), exposed, r))
        .max_by(|a, b| a.bonus().total_cmp(&b.bonus()))
        .unwrap_or(OneShantenShape::SurplusTile)
}
