//! Discard efficiency: which tile to let go of a 14 sized hand.

use super::shanten::ShapeKind;
use super::ukeire::UkeireMap;
use crate::analyzer::{Analyzer, visible_counts};
use crate::danger::DangerContext;
use crate::error::{AnalysisError, Result};
use crate::hand::Hand;
use crate::tile::{NUM_KINDS, Suit, Tile};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const KEEP_SHANTEN_SCORE: f32 = 50.0;
const UKEIRE_SCORE: f32 = 2.0;
const EXCLUDED_SUIT_SCORE: f32 = 100.0;
const DANGER_SCORE: f32 = 15.0;
const CENTRAL_TILE_PENALTY: f32 = 10.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficiencyConfig {
    /// Shape the shanten and ukeire are measured for.
    pub shape: ShapeKind,
    /// Look one draw ahead to break near ties.
    pub peak_theory: bool,
    /// Without a danger context, penalize discarding middle tiles and dragons.
    pub centrality_penalty: bool,
    /// Scores this close to the best one count as tied.
    pub tie_tolerance: f32,
    /// Weigh discards by their deal-in danger.
    pub danger: Option<DangerContext>,
}

impl Default for EfficiencyConfig {
    fn default() -> Self {
        Self {
            shape: ShapeKind::Standard,
            peak_theory: true,
            centrality_penalty: true,
            tie_tolerance: 0.1,
            danger: None,
        }
    }
}

/// Evaluation of one discard.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiscardScore {
    pub tile: Tile,
    pub score: f32,
    /// Shanten of the 13 tiles kept.
    pub after_shanten: i8,
    pub ukeire: UkeireMap,
    /// Part of `score` added by the one-draw lookahead.
    pub peak_bonus: f32,
    /// The discard does not raise shanten.
    pub keeps_shanten: bool,
    pub in_excluded_suit: bool,
}

impl DiscardScore {
    /// Candidates are ranked by shanten kept, then excluded suit, then score.
    pub(crate) fn same_tier(&self, other: &Self) -> bool {
        self.keeps_shanten == other.keeps_shanten && self.in_excluded_suit == other.in_excluded_suit
    }

    pub fn to_log_string(&self) -> String {
        format!(
            "{:<3} {:>7.2} {} {:>2} {:>3} {}{}",
            self.tile.to_string(),
            self.score,
            if self.keeps_shanten { '+' } else { '-' },
            self.after_shanten,
            self.ukeire.total(),
            self.ukeire,
            if self.peak_bonus > 0.0 {
                format!(" (peak +{:.2})", self.peak_bonus)
            } else {
                "".to_owned()
            },
        )
    }
}

/// Best first. Exact ties fall back to discard priority, then kind id.
pub(crate) fn sort_scores(scores: &mut [DiscardScore]) {
    scores.sort_by(|a, b| {
        b.keeps_shanten
            .cmp(&a.keeps_shanten)
            .then(b.in_excluded_suit.cmp(&a.in_excluded_suit))
            .then(b.score.total_cmp(&a.score))
            .then_with(|| b.tile.cmp_discard_priority(a.tile))
    });
}

fn is_central(tile: Tile) -> bool {
    matches!(tile.rank(), Some(3..=7)) || tile.is_dragon()
}

impl Analyzer {
    /// Scores every discard in `candidates` from a 14 sized hand, best first.
    ///
    /// `visible` lists the copies seen outside the hand; kinds of `excluded`
    /// never count as ukeire and discarding them is rewarded.
    pub fn efficiency(
        &self,
        hand: &Hand,
        candidates: &[Tile],
        visible: &[Tile],
        excluded: Option<Suit>,
        config: &EfficiencyConfig,
    ) -> Result<Vec<DiscardScore>> {
        hand.require_size(14)?;
        config.shape.check_legal(hand)?;
        let visible = visible_counts(hand, visible)?;

        let mut candidates = candidates.to_vec();
        candidates.sort_unstable();
        candidates.dedup();
        if candidates.is_empty() {
            return Err(AnalysisError::EmptyCandidateSet);
        }
        if let Some(tile) = candidates.iter().find(|&&tile| hand.count(tile) == 0) {
            return Err(AnalysisError::InvalidHandState(format!("candidate {tile} is not held")));
        }

        self.efficiency_unchecked(hand, &candidates, &visible, excluded, config)
    }

    /// Same as [`Analyzer::efficiency`] with every held kind as a candidate.
    pub fn best_discards(
        &self,
        hand: &Hand,
        visible: &[Tile],
        excluded: Option<Suit>,
        config: &EfficiencyConfig,
    ) -> Result<Vec<DiscardScore>> {
        self.efficiency(hand, &hand.distinct_tiles(), visible, excluded, config)
    }

    /// `candidates` are distinct and held.
    pub(crate) fn efficiency_unchecked(
        &self,
        hand: &Hand,
        candidates: &[Tile],
        visible: &[u8; NUM_KINDS],
        excluded: Option<Suit>,
        config: &EfficiencyConfig,
    ) -> Result<Vec<DiscardScore>> {
        let current = self.shanten_unchecked(hand, config.shape);
        let mut scores = candidates
            .par_iter()
            .map(|&tile| self.score_discard(hand, tile, visible, excluded, config, current))
            .collect::<Result<Vec<_>>>()?;
        sort_scores(&mut scores);

        if config.peak_theory {
            self.refine_with_peaks(hand, current, &mut scores, visible, excluded, config)?;
        }
        Ok(scores)
    }

    fn score_discard(
        &self,
        hand: &Hand,
        tile: Tile,
        visible: &[u8; NUM_KINDS],
        excluded: Option<Suit>,
        config: &EfficiencyConfig,
        current: i8,
    ) -> Result<DiscardScore> {
        let rest = hand.without_tile(tile)?;
        let after_shanten = self.shanten_unchecked(&rest, config.shape);
        let ukeire = self.ukeire_unchecked(&rest, excluded, visible, config.shape, after_shanten);
        let keeps_shanten = after_shanten <= current;
        let in_excluded_suit = excluded.is_some() && tile.suit() == excluded;

        let mut score = if keeps_shanten { KEEP_SHANTEN_SCORE } else { -KEEP_SHANTEN_SCORE };
        score += UKEIRE_SCORE * ukeire.total() as f32;
        if in_excluded_suit {
            score += EXCLUDED_SUIT_SCORE;
        }
        score -= match &config.danger {
            Some(context) => DANGER_SCORE * context.level(tile),
            None if config.centrality_penalty && is_central(tile) => CENTRAL_TILE_PENALTY,
            None => 0.0,
        };
        log::trace!("{hand} discard {tile}: {score:.2} at {after_shanten} shanten, {} ukeire", ukeire.total());

        Ok(DiscardScore {
            tile,
            score,
            after_shanten,
            ukeire,
            peak_bonus: 0.0,
            keeps_shanten,
            in_excluded_suit,
        })
    }
}
