use crate::algo::shanten::ShapeKind;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// A tile id, (suit, rank) pair or notation string that names no tile kind.
    InvalidTileKind(String),
    /// Counts that cannot exist on a table, e.g. five copies of one kind.
    InvalidHandState(String),
    /// `held + 3 * exposed_melds` is neither 13 nor 14 (or not the one the operation needs).
    InvalidHandSize { held: u8, exposed_melds: u8 },
    /// Seven pairs and thirteen orphans only exist for closed hands.
    InvalidShapeKind { shape: ShapeKind, exposed_melds: u8 },
    EmptyCandidateSet,
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileKind(s) => write!(f, "not a valid tile kind: \"{s}\""),
            Self::InvalidHandState(msg) => write!(f, "invalid hand state: {msg}"),
            Self::InvalidHandSize { held, exposed_melds } => write!(
                f,
                "invalid hand size: {held} held tiles with {exposed_melds} exposed melds (size {})",
                *held as u16 + 3 * *exposed_melds as u16
            ),
            Self::InvalidShapeKind { shape, exposed_melds } => {
                write!(f, "{shape} is not reachable with {exposed_melds} exposed melds")
            }
            Self::EmptyCandidateSet => f.write_str("no discard candidates given"),
        }
    }
}

impl std::error::Error for AnalysisError {}

pub type Result<T> = std::result::Result<T, AnalysisError>;
