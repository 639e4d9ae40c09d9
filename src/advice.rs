//! Choices made before play under the excluded-suit house rules: which suit
//! to give up, and which same-suit tiles to pass in the exchange.

use crate::algo::shanten::ShapeKind;
use crate::analyzer::Analyzer;
use crate::error::{AnalysisError, Result};
use crate::hand::Hand;
use crate::tile::{Suit, Tile};
use std::cmp::Reverse;

/// Standard shanten of what is left of `hand` once every tile of `suit` is
/// gone. The reduced hand is short, so the usual size check does not apply.
pub fn shanten_without_suit(analyzer: &Analyzer, hand: &Hand, suit: Suit) -> Result<i8> {
    hand.check_size()?;
    Ok(analyzer.shanten_unchecked(&hand.without_suit(suit), ShapeKind::Standard))
}

/// The suit whose removal leaves the lowest standard shanten. Ties go to the
/// suit with fewer tiles, then to suit order.
pub fn recommend_excluded_suit(analyzer: &Analyzer, hand: &Hand) -> Result<Suit> {
    hand.check_size()?;
    let [man, pin, sou] = Suit::ALL.map(|suit| {
        let shanten = analyzer.shanten_unchecked(&hand.without_suit(suit), ShapeKind::Standard);
        log::debug!("{hand} without {suit}: {shanten} shanten");
        (shanten, hand.suit_len(suit), suit)
    });
    Ok(man.min(pin).min(sou).2)
}

/// `count` tiles of a single suit to pass on, chosen so that what remains
/// has the lowest standard shanten.
pub fn exchange_tiles(analyzer: &Analyzer, hand: &Hand, count: u8) -> Result<Vec<Tile>> {
    hand.check_size()?;
    if count == 0 {
        return Err(AnalysisError::InvalidHandState("nothing to exchange".to_owned()));
    }

    let mut best = None;
    for suit in Suit::ALL {
        let suit_len = hand.suit_len(suit);
        if suit_len < count {
            continue;
        }
        for taken in combinations(&hand.suit_counts(suit), count) {
            let mut counts = *hand.counts();
            let tiles = suit
                .tiles()
                .zip(taken)
                .flat_map(|(tile, n)| std::iter::repeat_n(tile, n as usize))
                .collect::<Vec<_>>();
            for &tile in &tiles {
                counts[tile.as_usize()] -= 1;
            }
            let rest = Hand::new(counts, hand.exposed_melds())?;
            let shanten = analyzer.shanten_unchecked(&rest, ShapeKind::Standard);
            let priority = tiles.iter().map(|t| t.discard_priority() as u32).sum::<u32>();
            let key = (shanten, suit_len, Reverse(priority), suit);
            if best.as_ref().is_none_or(|(k, _)| key < *k) {
                best = Some((key, tiles));
            }
        }
    }

    best.map(|(_, tiles)| tiles).ok_or_else(|| {
        AnalysisError::InvalidHandState(format!("{hand} has no suit with {count} tiles to exchange"))
    })
}

/// Every way to take `count` tiles out of one suit, as per-rank counts.
fn combinations(counts: &[u8; 9], count: u8) -> Vec<[u8; 9]> {
    fn go(counts: &[u8; 9], rank: usize, left: u8, cur: &mut [u8; 9], out: &mut Vec<[u8; 9]>) {
        if left == 0 {
            out.push(*cur);
            return;
        }
        if rank == 9 {
            return;
        }
        for take in (0..=counts[rank].min(left)).rev() {
            cur[rank] = take;
            go(counts, rank + 1, left - take, cur, out);
        }
        cur[rank] = 0;
    }

    let mut out = vec![];
    go(counts, 0, count, &mut [0; 9], &mut out);
    out
}
