use crate::error::AnalysisError;
use crate::{matches_tu8, t, tu8};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use ahash::AHashMap;
use serde_with::{DeserializeFromStr, SerializeDisplay};

pub const NUM_KINDS: usize = 34;
pub const NUM_NUMBERED: usize = 27;

const MJAI_PAI_STRINGS: [&str; NUM_KINDS] = [
    "1m", "2m", "3m", "4m", "5m", "6m", "7m", "8m", "9m", // m
    "1p", "2p", "3p", "4p", "5p", "6p", "7p", "8p", "9p", // p
    "1s", "2s", "3s", "4s", "5s", "6s", "7s", "8s", "9s", // s
    "E", "S", "W", "N", "P", "F", "C", // z
];
/// Higher is discarded first when everything else is equal.
const DISCARD_PRIORITIES: [u8; NUM_KINDS] = [
    6, 5, 4, 3, 2, 3, 4, 5, 6, // m
    6, 5, 4, 3, 2, 3, 4, 5, 6, // p
    6, 5, 4, 3, 2, 3, 4, 5, 6, // s
    7, 7, 7, 7, 7, 7, 7, // z
];

static MJAI_PAI_STRINGS_MAP: LazyLock<AHashMap<&'static str, Tile>> = LazyLock::new(|| {
    MJAI_PAI_STRINGS
        .iter()
        .zip(Tile::all())
        .map(|(&s, tile)| (s, tile))
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub enum Suit {
    Man,
    Pin,
    Sou,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Honor {
    East,
    South,
    West,
    North,
    White,
    Green,
    Red,
}

/// Structured view of a [`Tile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Numbered { suit: Suit, rank: u8 },
    Honor(Honor),
}

/// One of the 34 tile kinds. Physical copies are not distinguished.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct Tile(u8);

impl Suit {
    pub const ALL: [Suit; 3] = [Suit::Man, Suit::Pin, Suit::Sou];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Id of rank 1 of this suit.
    #[inline]
    #[must_use]
    pub const fn base(self) -> usize {
        self.index() * 9
    }

    #[inline]
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Suit::Man => 'm',
            Suit::Pin => 'p',
            Suit::Sou => 's',
        }
    }

    pub fn tiles(self) -> impl Iterator<Item = Tile> {
        (self.base() as u8..self.base() as u8 + 9).map(Tile)
    }
}

impl Honor {
    pub const ALL: [Honor; 7] = [
        Honor::East,
        Honor::South,
        Honor::West,
        Honor::North,
        Honor::White,
        Honor::Green,
        Honor::Red,
    ];

    #[inline]
    #[must_use]
    pub const fn is_dragon(self) -> bool {
        matches!(self, Honor::White | Honor::Green | Honor::Red)
    }
}

impl Tile {
    /// The caller guarantees `id < 34`.
    #[inline]
    #[must_use]
    pub const fn new_unchecked(id: u8) -> Self {
        Self(id)
    }

    pub fn numbered(suit: Suit, rank: u8) -> Result<Self, AnalysisError> {
        if !(1..=9).contains(&rank) {
            return Err(AnalysisError::InvalidTileKind(format!("{rank}{}", suit.as_char())));
        }
        Ok(Self(suit.base() as u8 + rank - 1))
    }

    #[inline]
    #[must_use]
    pub const fn honor(honor: Honor) -> Self {
        Self(tu8!(E) + honor as u8)
    }

    /// Every kind in id order.
    pub fn all() -> impl Iterator<Item = Tile> {
        (0..NUM_KINDS as u8).map(Tile)
    }

    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    #[must_use]
    pub const fn suit(self) -> Option<Suit> {
        match self.0 / 9 {
            0 => Some(Suit::Man),
            1 => Some(Suit::Pin),
            2 => Some(Suit::Sou),
            _ => None,
        }
    }

    /// 1..=9 for numbered tiles.
    #[inline]
    #[must_use]
    pub const fn rank(self) -> Option<u8> {
        if self.is_honor() { None } else { Some(self.0 % 9 + 1) }
    }

    #[must_use]
    pub const fn kind(self) -> TileKind {
        match self.suit() {
            Some(suit) => TileKind::Numbered {
                suit,
                rank: self.0 % 9 + 1,
            },
            None => TileKind::Honor(Honor::ALL[(self.0 - tu8!(E)) as usize]),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_honor(self) -> bool {
        matches_tu8!(self.0, E | S | W | N | P | F | C)
    }

    #[inline]
    #[must_use]
    pub const fn is_wind(self) -> bool {
        matches_tu8!(self.0, E | S | W | N)
    }

    #[inline]
    #[must_use]
    pub const fn is_dragon(self) -> bool {
        matches_tu8!(self.0, P | F | C)
    }

    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches_tu8!(self.0, 1m | 9m | 1p | 9p | 1s | 9s)
    }

    /// Terminal or honor.
    #[inline]
    #[must_use]
    pub const fn is_orphan(self) -> bool {
        self.is_terminal() || self.is_honor()
    }

    /// Same-suit tile `delta` ranks away, if it exists.
    #[inline]
    #[must_use]
    pub const fn offset(self, delta: i8) -> Option<Self> {
        if self.is_honor() {
            return None;
        }
        let rank = (self.0 % 9) as i8 + delta;
        if rank < 0 || rank > 8 {
            None
        } else {
            Some(Self((self.0 as i8 + delta) as u8))
        }
    }

    /// Higher is discarded sooner: honors, then terminals, then toward the middle.
    #[inline]
    #[must_use]
    pub const fn discard_priority(self) -> u8 {
        DISCARD_PRIORITIES[self.0 as usize]
    }

    /// `Ordering::Equal` iff `self == other`
    #[inline]
    #[must_use]
    pub fn cmp_discard_priority(self, other: Self) -> Ordering {
        let l = self.0 as usize;
        let r = other.0 as usize;
        match DISCARD_PRIORITIES[l].cmp(&DISCARD_PRIORITIES[r]) {
            Ordering::Equal => r.cmp(&l),
            o => o,
        }
    }
}

impl TryFrom<u8> for Tile {
    type Error = AnalysisError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Self::try_from(v as usize)
    }
}

impl TryFrom<usize> for Tile {
    type Error = AnalysisError;

    fn try_from(v: usize) -> Result<Self, Self::Error> {
        if v >= NUM_KINDS {
            Err(AnalysisError::InvalidTileKind(v.to_string()))
        } else {
            Ok(Self(v as u8))
        }
    }
}

impl TryFrom<TileKind> for Tile {
    type Error = AnalysisError;

    fn try_from(kind: TileKind) -> Result<Self, Self::Error> {
        match kind {
            TileKind::Numbered { suit, rank } => Self::numbered(suit, rank),
            TileKind::Honor(honor) => Ok(Self::honor(honor)),
        }
    }
}

impl FromStr for Tile {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MJAI_PAI_STRINGS_MAP
            .get(s)
            .copied()
            .ok_or_else(|| AnalysisError::InvalidTileKind(s.to_owned()))
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MJAI_PAI_STRINGS[self.0 as usize])
    }
}

impl FromStr for Suit {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" | "man" => Ok(Suit::Man),
            "p" | "pin" => Ok(Suit::Pin),
            "s" | "sou" => Ok(Suit::Sou),
            _ => Err(AnalysisError::InvalidTileKind(s.to_owned())),
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn convert() {
        "E".parse::<Tile>().unwrap();
        "9s".parse::<Tile>().unwrap();
        Tile::try_from(0_u8).unwrap();
        Tile::try_from(33_u8).unwrap();

        "".parse::<Tile>().unwrap_err();
        "0s".parse::<Tile>().unwrap_err();
        "5mr".parse::<Tile>().unwrap_err();
        "?".parse::<Tile>().unwrap_err();
        Tile::try_from(34_u8).unwrap_err();
        Tile::try_from(u8::MAX).unwrap_err();

        for tile in Tile::all() {
            assert_eq!(tile.to_string().parse::<Tile>().unwrap(), tile);
            assert_eq!(Tile::try_from(tile.kind()).unwrap(), tile);
        }

        let kind = |rank| TileKind::Numbered { suit: Suit::Pin, rank };
        assert_eq!(Tile::try_from(kind(1)).unwrap(), t!(1p));
        assert!(matches!(Tile::try_from(kind(0)), Err(AnalysisError::InvalidTileKind(_))));
        assert!(matches!(Tile::try_from(kind(10)), Err(AnalysisError::InvalidTileKind(_))));
    }

    #[test]
    fn suit_rank() {
        assert_eq!(Tile::numbered(Suit::Pin, 4).unwrap(), t!(4p));
        assert_eq!(Tile::numbered(Suit::Sou, 9).unwrap(), t!(9s));
        Tile::numbered(Suit::Man, 0).unwrap_err();
        Tile::numbered(Suit::Man, 10).unwrap_err();

        assert_eq!(t!(7p).suit(), Some(Suit::Pin));
        assert_eq!(t!(7p).rank(), Some(7));
        assert_eq!(t!(C).suit(), None);
        assert_eq!(t!(C).rank(), None);
        assert_eq!(t!(F).kind(), TileKind::Honor(Honor::Green));
        assert_eq!(Tile::honor(Honor::White), t!(P));
        assert_eq!(t!(3s).kind(), TileKind::Numbered { suit: Suit::Sou, rank: 3 });
        assert_eq!(Suit::Sou.tiles().collect::<Vec<_>>(), t![1s, 2s, 3s, 4s, 5s, 6s, 7s, 8s, 9s,]);
    }

    #[test]
    fn classes() {
        assert!(t!(E).is_wind() && !t!(E).is_dragon() && t!(E).is_orphan());
        assert!(t!(C).is_dragon() && t!(C).is_honor());
        assert!(t!(1m).is_terminal() && t!(9s).is_orphan());
        assert!(!t!(2p).is_orphan());
    }

    #[test]
    fn offset() {
        assert_eq!(t!(5m).offset(3), Some(t!(8m)));
        assert_eq!(t!(5m).offset(-4), Some(t!(1m)));
        assert_eq!(t!(8m).offset(2), None);
        assert_eq!(t!(1p).offset(-1), None);
        assert_eq!(t!(E).offset(1), None);
    }

    #[test]
    fn discard_priority() {
        assert_eq!(t!(E).cmp_discard_priority(t!(1m)), Ordering::Greater);
        assert_eq!(t!(1m).cmp_discard_priority(t!(5m)), Ordering::Greater);
        assert_eq!(t!(2m).cmp_discard_priority(t!(8m)), Ordering::Greater);
        assert_eq!(t!(3p).cmp_discard_priority(t!(3p)), Ordering::Equal);
        assert_eq!(t!(C).discard_priority(), 7);
        assert_eq!(t!(5s).discard_priority(), 2);
    }

    #[test]
    fn serde() {
        assert_eq!(serde_json::to_string(&t!(5p)).unwrap(), "\"5p\"");
        assert_eq!(serde_json::from_str::<Tile>("\"N\"").unwrap(), t!(N));
        serde_json::from_str::<Tile>("\"0m\"").unwrap_err();
        assert_eq!(serde_json::to_string(&Suit::Sou).unwrap(), "\"s\"");
        assert_eq!("pin".parse::<Suit>().unwrap(), Suit::Pin);
    }
}
