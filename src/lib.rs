//! Hand analysis for riichi-style mahjong: shanten, ukeire, waits, discard
//! efficiency and a rough deal-in danger estimate.

#[macro_use]
mod macros;

pub mod advice;
pub mod algo;
pub mod analyzer;
pub mod cache;
pub mod danger;
pub mod error;
pub mod hand;
pub mod report;
pub mod tile;

pub use algo::efficiency::{DiscardScore, EfficiencyConfig};
pub use algo::shanten::ShapeKind;
pub use algo::ukeire::UkeireMap;
pub use algo::wait::{OneShantenShape, WaitPattern};
pub use analyzer::Analyzer;
pub use cache::ShantenCache;
pub use danger::DangerContext;
pub use error::{AnalysisError, Result};
pub use hand::Hand;
pub use report::HandReport;
pub use tile::{Suit, Tile};
