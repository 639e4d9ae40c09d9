use crate::hand::Hand;
use crate::tile::{NUM_KINDS, Suit, Tile};
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Tile kinds that lower shanten when drawn, with the copies still unseen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UkeireMap(BTreeMap<Tile, u8>);

impl UkeireMap {
    #[must_use]
    pub fn get(&self, tile: Tile) -> Option<u8> {
        self.0.get(&tile).copied()
    }

    #[must_use]
    pub fn contains(&self, tile: Tile) -> bool {
        self.0.contains_key(&tile)
    }

    /// Number of kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of physical tiles.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.values().map(|&c| c as u32).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tile, u8)> + '_ {
        self.0.iter().map(|(&tile, &count)| (tile, count))
    }

    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.0.keys().copied()
    }
}

impl FromIterator<(Tile, u8)> for UkeireMap {
    fn from_iter<I: IntoIterator<Item = (Tile, u8)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for UkeireMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self
            .iter()
            .map(|(tile, count)| format!("{tile}[{count}]"))
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&s)
    }
}

/// Kinds outside `excluded` that take `hand` below `current` shanten, as
/// judged by `shanten`. `hand` and `visible` must already be consistent.
pub fn ukeire_with(
    hand: &Hand,
    excluded: Option<Suit>,
    visible: &[u8; NUM_KINDS],
    current: i8,
    mut shanten: impl FnMut(&Hand) -> i8,
) -> UkeireMap {
    Tile::all()
        .filter(|&tile| excluded.is_none() || tile.suit() != excluded)
        .filter_map(|tile| {
            let remaining = 4_u8.checked_sub(hand.count(tile) + visible[tile.as_usize()])?;
            if remaining == 0 {
                return None;
            }
            let drawn = hand.with_tile(tile).ok()?;
            (shanten(&drawn) < current).then_some((tile, remaining))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::decompose::SuitTable;
    use crate::algo::shanten::standard_with;
    use crate::t;

    fn standard_ukeire(s: &str, excluded: Option<Suit>, visible: &[u8; NUM_KINDS]) -> UkeireMap {
        let hand: Hand = s.parse().unwrap();
        let mut table = SuitTable::default();
        let current = standard_with(&hand, |v| table.blocks(v));
        ukeire_with(&hand, excluded, visible, current, |h| standard_with(h, |v| table.blocks(v)))
    }

    #[test]
    fn nine_gates_like() {
        let ukeire = standard_ukeire("123456789m 1123p", None, &[0; NUM_KINDS]);
        assert_eq!(ukeire.get(t!(4p)), Some(4));
        assert_eq!(ukeire.get(t!(1p)), Some(2));
        assert!(!ukeire.contains(t!(5p)));
        assert_eq!(ukeire.to_string(), "1p[2] 4p[4]");
        assert_eq!(ukeire.total(), 6);
    }

    #[test]
    fn visible_and_excluded() {
        let mut visible = [0; NUM_KINDS];
        visible[t!(4p).as_usize()] = 4;
        let ukeire = standard_ukeire("123456789m 1123p", None, &visible);
        assert!(!ukeire.contains(t!(4p)));
        assert_eq!(ukeire.len(), 1);

        let ukeire = standard_ukeire("123456789m 1123p", Some(Suit::Pin), &[0; NUM_KINDS]);
        assert!(ukeire.is_empty());
    }

    #[test]
    fn serde() {
        let ukeire: UkeireMap = [(t!(3m), 4), (t!(E), 1)].into_iter().collect();
        let json = serde_json::to_string(&ukeire).unwrap();
        assert_eq!(json, r#"{"3m":4,"E":1}"#);
        assert_eq!(serde_json::from_str::<UkeireMap>(&json).unwrap(), ukeire);
    }
}
