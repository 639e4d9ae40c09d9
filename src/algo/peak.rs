//! One-draw lookahead for discards whose scores are too close to call.
//!
//! For each draw that improves the hand, the best follow-up discard is found
//! and the quality of the wait (or one-shanten shape) it leaves behind is
//! averaged, weighted by the copies left of the drawn kind.

use super::efficiency::{DiscardScore, EfficiencyConfig, sort_scores};
use super::wait::{OneShantenShape, WaitPattern, wait_pattern};
use crate::analyzer::Analyzer;
use crate::error::Result;
use crate::hand::Hand;
use crate::tile::{NUM_KINDS, Suit};
use std::collections::BTreeSet;

/// Lookahead only pays off this close to tenpai.
pub const PEAK_SHANTEN_LIMIT: i8 = 2;
/// How many of the best candidates may be refined.
pub const PEAK_CANDIDATES: usize = 3;

const MULTI_SIDED_WEIGHT: f32 = 12.0;
const TWO_SIDED_WEIGHT: f32 = 8.0;
const UKEIRE_WEIGHT: f32 = 1.5;
const VARIETY_WEIGHT: f32 = 5.0;
const SINGLE_WEIGHT: f32 = 5.0;

/// Weighted tally of the positions reached after one draw.
#[derive(Debug, Default)]
struct PeakStats {
    tenpai_weight: f32,
    multi_sided: f32,
    two_sided: f32,
    single: f32,
    ukeire: f32,
    patterns: BTreeSet<WaitPattern>,
    shape_weight: f32,
    shape_bonus: f32,
}

impl PeakStats {
    fn add_tenpai(&mut self, pattern: WaitPattern, ukeire: u32, weight: f32) {
        self.tenpai_weight += weight;
        if pattern.is_multi_sided() {
            self.multi_sided += weight;
        } else if pattern == WaitPattern::TwoSided {
            self.two_sided += weight;
        }
        if pattern.is_single() {
            self.single += weight;
        }
        self.ukeire += ukeire as f32 * weight;
        self.patterns.insert(pattern);
    }

    fn add_one_shanten(&mut self, shape: OneShantenShape, weight: f32) {
        self.shape_weight += weight;
        self.shape_bonus += shape.bonus() * weight;
    }

    fn bonus(&self) -> f32 {
        let mut bonus = 0.0;
        if self.tenpai_weight > 0.0 {
            let w = self.tenpai_weight;
            bonus += MULTI_SIDED_WEIGHT * self.multi_sided / w
                + TWO_SIDED_WEIGHT * self.two_sided / w
                + UKEIRE_WEIGHT * self.ukeire / w
                + VARIETY_WEIGHT * self.patterns.len() as f32
                - SINGLE_WEIGHT * self.single / w;
        }
        if self.shape_weight > 0.0 {
            bonus += self.shape_bonus / self.shape_weight;
        }
        bonus.max(0.0)
    }
}

impl Analyzer {
    /// Adds a lookahead bonus to the near-tied head of `scores` and re-sorts.
    /// Candidates outside the tie are left untouched.
    pub(crate) fn refine_with_peaks(
        &self,
        hand: &Hand,
        current: i8,
        scores: &mut [DiscardScore],
        visible: &[u8; NUM_KINDS],
        excluded: Option<Suit>,
        config: &EfficiencyConfig,
    ) -> Result<()> {
        if current > PEAK_SHANTEN_LIMIT {
            return Ok(());
        }
        let Some(best) = scores.first() else {
            return Ok(());
        };
        let tied = scores
            .iter()
            .take(PEAK_CANDIDATES)
            .enumerate()
            .filter(|(_, s)| s.same_tier(best) && best.score - s.score <= config.tie_tolerance)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        if tied.len() < 2 {
            return Ok(());
        }

        let lookahead = EfficiencyConfig {
            peak_theory: false,
            ..config.clone()
        };
        for i in tied {
            let bonus = self.peak_bonus(hand, &scores[i], visible, excluded, &lookahead)?;
            log::debug!("{hand} discard {}: peak bonus {bonus:.2}", scores[i].tile);
            scores[i].peak_bonus = bonus;
            scores[i].score += bonus;
        }
        sort_scores(scores);
        Ok(())
    }

    fn peak_bonus(
        &self,
        hand: &Hand,
        candidate: &DiscardScore,
        visible: &[u8; NUM_KINDS],
        excluded: Option<Suit>,
        lookahead: &EfficiencyConfig,
    ) -> Result<f32> {
        let rest = hand.without_tile(candidate.tile)?;
        let mut stats = PeakStats::default();

        // already tenpai, every improving draw wins: judge the wait itself
        if candidate.after_shanten == 0 {
            let pattern = wait_pattern(&rest, &candidate.ukeire);
            stats.add_tenpai(pattern, candidate.ukeire.total(), 1.0);
            return Ok(stats.bonus());
        }

        for (tile, copies) in candidate.ukeire.iter() {
            let drawn = rest.with_tile(tile)?;
            let follow = self.efficiency_unchecked(&drawn, &drawn.distinct_tiles(), visible, excluded, lookahead)?;
            let Some(next) = follow.first() else {
                continue;
            };
            let settled = drawn.without_tile(next.tile)?;
            let weight = copies as f32;
            match next.after_shanten {
                0 => stats.add_tenpai(wait_pattern(&settled, &next.ukeire), next.ukeire.total(), weight),
                1 => {
                    if let Some(shape) = self.one_shanten_shape(&settled) {
                        stats.add_one_shanten(shape, weight);
                    }
                }
                _ => (),
            }
        }
        Ok(stats.bonus())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::t;

    #[test]
    fn stats_bonus() {
        let mut stats = PeakStats::default();
        assert_eq!(stats.bonus(), 0.0);

        stats.add_tenpai(WaitPattern::TwoSided, 8, 2.0);
        stats.add_tenpai(WaitPattern::Closed, 4, 2.0);
        // 8 * 0.5 + 1.5 * 6 + 5 * 2 - 5 * 0.5
        assert!((stats.bonus() - 20.5).abs() < 1e-4);

        let mut stats = PeakStats::default();
        stats.add_tenpai(WaitPattern::NoWait, 0, 1.0);
        stats.add_tenpai(WaitPattern::NoWait, 0, 1.0);
        assert_eq!(stats.bonus(), 0.0);

        let mut stats = PeakStats::default();
        stats.add_one_shanten(OneShantenShape::DoubleFloat, 3.0);
        stats.add_one_shanten(OneShantenShape::SurplusTile, 1.0);
        assert!((stats.bonus() - 32.5).abs() < 1e-4);
    }

    #[test]
    fn symmetric_tie() {
        let analyzer = Analyzer::new();
        let hand: Hand = "234m 456p 678s 55p 2s E W".parse().unwrap();
        let config = EfficiencyConfig::default();
        let scores = analyzer.best_discards(&hand, &[], None, &config).unwrap();
        assert_eq!(scores[0].tile, t!(E));
        assert_eq!(scores[1].tile, t!(W));
        assert_eq!(scores[0].peak_bonus, scores[1].peak_bonus);
        assert!(scores[0].peak_bonus >= 0.0);
        assert!(scores.iter().skip(2).all(|s| s.peak_bonus == 0.0));
    }

    #[test]
    fn lookahead_breaks_tie() {
        let analyzer = Analyzer::new();
        let hand: Hand = "1233489m 344p 599s C".parse().unwrap();
        let plain = EfficiencyConfig {
            peak_theory: false,
            ..Default::default()
        };
        let without = analyzer.best_discards(&hand, &[], None, &plain).unwrap();
        assert_eq!(without[0].tile, t!(C));

        let with = analyzer.best_discards(&hand, &[], None, &EfficiencyConfig::default()).unwrap();
        assert_eq!(with[0].tile, t!(5s));
        assert!(with[0].peak_bonus > 0.0);
        assert!(with[0].peak_bonus > with.iter().find(|s| s.tile == t!(C)).unwrap().peak_bonus);
    }

    #[test]
    fn clear_winner_untouched() {
        let analyzer = Analyzer::new();
        let hand: Hand = "123456789m 1123p E".parse().unwrap();
        let with = analyzer.best_discards(&hand, &[], None, &EfficiencyConfig::default()).unwrap();
        let without = analyzer
            .best_discards(
                &hand,
                &[],
                None,
                &EfficiencyConfig {
                    peak_theory: false,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(with, without);
    }
}
