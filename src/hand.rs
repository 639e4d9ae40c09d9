//! Hand multiset and its string format.
//!
//! Strings use the compact `123m 456p 77z` form; honors may also be written
//! with their mjai letters (`E S W N P F C`). A trailing `+N` records `N`
//! exposed melds, e.g. `234m 55p 678s +1`.

use crate::error::{AnalysisError, Result};
use crate::tile::{NUM_KINDS, Suit, Tile};
use crate::{t, tuz};
use std::fmt;
use std::str::FromStr;

use derivative::Derivative;
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Tiles held in hand as counts per kind, plus how many melds are already
/// exposed on the table.
///
/// Every count is at most 4 and `exposed_melds` at most 4. The size rule
/// (`held + 3 * exposed_melds` is 13 or 14) is only enforced by operations
/// that need it, see [`Hand::check_size`].
#[derive(Clone, PartialEq, Eq, Hash, Derivative, SerializeDisplay, DeserializeFromStr)]
#[derivative(Default)]
pub struct Hand {
    #[derivative(Default(value = "[0; NUM_KINDS]"))]
    counts: [u8; NUM_KINDS],
    exposed_melds: u8,
}

impl Hand {
    pub fn new(counts: [u8; NUM_KINDS], exposed_melds: u8) -> Result<Self> {
        if let Some((tid, &count)) = counts.iter().enumerate().find(|&(_, &c)| c > 4) {
            return Err(AnalysisError::InvalidHandState(format!(
                "{count} copies of {}",
                Tile::new_unchecked(tid as u8)
            )));
        }
        if exposed_melds > 4 {
            return Err(AnalysisError::InvalidHandState(format!("{exposed_melds} exposed melds")));
        }
        Ok(Self { counts, exposed_melds })
    }

    pub fn from_tiles(tiles: &[Tile], exposed_melds: u8) -> Result<Self> {
        Self::new(count_tiles(tiles), exposed_melds)
    }

    #[inline]
    #[must_use]
    pub const fn counts(&self) -> &[u8; NUM_KINDS] {
        &self.counts
    }

    #[inline]
    #[must_use]
    pub const fn count(&self, tile: Tile) -> u8 {
        self.counts[tile.as_usize()]
    }

    #[inline]
    #[must_use]
    pub const fn exposed_melds(&self) -> u8 {
        self.exposed_melds
    }

    /// Number of tiles physically held.
    #[must_use]
    pub fn held(&self) -> u8 {
        self.counts.iter().sum()
    }

    /// `held + 3 * exposed_melds`, the size the game rules talk about.
    #[must_use]
    pub fn size(&self) -> u8 {
        self.held() + 3 * self.exposed_melds
    }

    /// Returns the size when it is 13 (waiting) or 14 (about to discard).
    pub fn check_size(&self) -> Result<u8> {
        match self.size() {
            size @ (13 | 14) => Ok(size),
            _ => Err(self.size_error()),
        }
    }

    pub fn require_size(&self, size: u8) -> Result<()> {
        if self.size() == size { Ok(()) } else { Err(self.size_error()) }
    }

    fn size_error(&self) -> AnalysisError {
        AnalysisError::InvalidHandSize {
            held: self.held(),
            exposed_melds: self.exposed_melds,
        }
    }

    #[must_use]
    pub fn suit_counts(&self, suit: Suit) -> [u8; 9] {
        let mut ret = [0; 9];
        ret.copy_from_slice(&self.counts[suit.base()..suit.base() + 9]);
        ret
    }

    #[inline]
    #[must_use]
    pub fn honor_counts(&self) -> &[u8] {
        &self.counts[tuz!(E)..]
    }

    #[must_use]
    pub fn suit_len(&self, suit: Suit) -> u8 {
        self.suit_counts(suit).iter().sum()
    }

    /// A copy with one more `tile`.
    pub fn with_tile(&self, tile: Tile) -> Result<Self> {
        let mut counts = self.counts;
        counts[tile.as_usize()] += 1;
        Self::new(counts, self.exposed_melds)
    }

    /// A copy with one `tile` less.
    pub fn without_tile(&self, tile: Tile) -> Result<Self> {
        let mut ret = self.clone();
        let count = &mut ret.counts[tile.as_usize()];
        if *count == 0 {
            return Err(AnalysisError::InvalidHandState(format!("{tile} is not held")));
        }
        *count -= 1;
        Ok(ret)
    }

    /// A copy with every tile of `suit` removed. The result usually breaks
    /// the size rule.
    #[must_use]
    pub fn without_suit(&self, suit: Suit) -> Self {
        let mut ret = self.clone();
        ret.counts[suit.base()..suit.base() + 9].fill(0);
        ret
    }

    #[must_use]
    pub fn tiles(&self) -> Vec<Tile> {
        tile34_to_vec(&self.counts)
    }

    /// Held kinds in id order, each once.
    #[must_use]
    pub fn distinct_tiles(&self) -> Vec<Tile> {
        Tile::all().filter(|&tile| self.count(tile) > 0).collect()
    }

    /// Unique key of the hand, counts in base 5 followed by the exposed melds.
    #[must_use]
    pub fn key(&self) -> u128 {
        self.counts
            .iter()
            .rev()
            .fold(0_u128, |acc, &c| acc * 5 + c as u128)
            * 5
            + self.exposed_melds as u128
    }

    /// Fails when held plus visible copies of any kind exceed 4.
    pub fn check_visible(&self, visible: &[u8; NUM_KINDS]) -> Result<()> {
        match Tile::all().find(|&tile| self.count(tile) + visible[tile.as_usize()] > 4) {
            Some(tile) => Err(AnalysisError::InvalidHandState(format!(
                "{} held and {} visible copies of {tile}",
                self.count(tile),
                visible[tile.as_usize()],
            ))),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&tiles_to_string(&self.counts))?;
        if self.exposed_melds > 0 {
            write!(f, " +{}", self.exposed_melds)?;
        }
        Ok(())
    }
}

impl FromStr for Hand {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        let (tiles, exposed_melds) = match s.split_once('+') {
            Some((tiles, exposed)) => {
                let exposed = exposed
                    .trim()
                    .parse()
                    .map_err(|_| AnalysisError::InvalidHandState(format!("bad exposed meld count in \"{s}\"")))?;
                (tiles, exposed)
            }
            None => (s, 0),
        };
        Self::new(hand(tiles)?, exposed_melds)
    }
}

/// Parse tiles into a list in the order they are written.
pub fn parse_tiles(s: &str) -> Result<Vec<Tile>> {
    if !s.is_ascii() {
        return Err(AnalysisError::InvalidTileKind(s.to_owned()));
    }

    let mut tiles = vec![];
    let mut stack = vec![];

    for &b in s.as_bytes() {
        match b {
            b'1'..=b'9' => stack.push(b - b'0'),
            b'm' | b'p' | b's' | b'z' => {
                let kind = match b {
                    b'm' => 0,
                    b'p' => 1,
                    b's' => 2,
                    _ => 3,
                };
                for num in stack.drain(..) {
                    if kind == 3 && num > 7 {
                        return Err(AnalysisError::InvalidTileKind(format!("{num}z")));
                    }
                    tiles.push(Tile::new_unchecked(kind * 9 + num - 1));
                }
            }
            b'E' | b'S' | b'W' | b'N' | b'P' | b'F' | b'C' if stack.is_empty() => tiles.push(match b {
                b'E' => t!(E),
                b'S' => t!(S),
                b'W' => t!(W),
                b'N' => t!(N),
                b'P' => t!(P),
                b'F' => t!(F),
                _ => t!(C),
            }),
            _ if b.is_ascii_whitespace() => (),
            _ => return Err(AnalysisError::InvalidTileKind(format!("unexpected byte {:?} in \"{s}\"", b as char))),
        };
    }
    if !stack.is_empty() {
        return Err(AnalysisError::InvalidTileKind(format!("missing suit in \"{s}\"")));
    }

    Ok(tiles)
}

/// Spaces are allowed.
pub fn hand(s: &str) -> Result<[u8; NUM_KINDS]> {
    Ok(count_tiles(&parse_tiles(s)?))
}

#[must_use]
pub fn count_tiles(tiles: &[Tile]) -> [u8; NUM_KINDS] {
    let mut ret = [0u8; NUM_KINDS];
    for tile in tiles {
        ret[tile.as_usize()] = ret[tile.as_usize()].saturating_add(1);
    }
    ret
}

#[must_use]
pub fn tile34_to_vec(tiles: &[u8; NUM_KINDS]) -> Vec<Tile> {
    let mut ret = vec![];
    Tile::all()
        .filter(|&tile| tiles[tile.as_usize()] > 0)
        .for_each(|tile| ret.resize(ret.len() + tiles[tile.as_usize()] as usize, tile));
    ret
}

#[must_use]
pub fn tiles_to_string(tiles: &[u8; NUM_KINDS]) -> String {
    let suhai = tiles[..3 * 9]
        .chunks_exact(9)
        .zip(Suit::ALL)
        .filter(|(chunk, _)| chunk.iter().any(|&c| c > 0))
        .map(|(chunk, suit)| {
            let mut partial = chunk
                .iter()
                .enumerate()
                .map(|(num, &count)| (num + 1).to_string().repeat(count as usize))
                .collect::<String>();
            partial.push(suit.as_char());
            partial
        })
        .collect::<Vec<_>>()
        .join(" ");

    let jihai: String = tiles[3 * 9..]
        .iter()
        .enumerate()
        .map(|(num, &count)| (num + 1).to_string().repeat(count as usize))
        .collect();

    match (suhai.is_empty(), jihai.is_empty()) {
        (_, true) => suhai,
        (true, false) => format!("{jihai}z"),
        (false, false) => format!("{suhai} {jihai}z"),
    }
}
