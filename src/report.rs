use crate::algo::efficiency::{DiscardScore, EfficiencyConfig};
use crate::algo::shanten::ShapeKind;
use crate::algo::ukeire::UkeireMap;
use crate::algo::wait::{OneShantenShape, WaitPattern};
use crate::analyzer::Analyzer;
use crate::danger::{TileDanger, rank_by_safety};
use crate::error::Result;
use crate::hand::Hand;
use crate::tile::{Suit, Tile};

use serde::Serialize;

/// Everything worth knowing about a hand at a glance.
///
/// A 13 sized hand gets its ukeire and, near tenpai, its wait or one-shanten
/// shape. A 14 sized hand gets a ranked discard table and, when the config
/// carries a danger context, the danger of every held kind.
#[derive(Debug, Clone, Serialize)]
pub struct HandReport {
    pub hand: Hand,
    pub excluded: Option<Suit>,
    /// Shanten for every shape the hand can still reach.
    pub shanten: Vec<(ShapeKind, i8)>,
    pub min_shanten: i8,
    pub best_shape: ShapeKind,
    /// Ukeire for `best_shape`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ukeire: Option<UkeireMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<WaitPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_shanten: Option<OneShantenShape>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<DiscardScore>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub danger: Vec<TileDanger>,
}

impl HandReport {
    pub fn analyze(
        analyzer: &Analyzer,
        hand: &Hand,
        visible: &[Tile],
        excluded: Option<Suit>,
        config: &EfficiencyConfig,
    ) -> Result<Self> {
        let size = hand.check_size()?;
        let shanten = ShapeKind::legal_for(hand)
            .map(|shape| analyzer.shanten(hand, shape).map(|s| (shape, s)))
            .collect::<Result<Vec<_>>>()?;
        let (min_shanten, best_shape) = analyzer.min_shanten(hand)?;

        let mut report = Self {
            hand: hand.clone(),
            excluded,
            shanten,
            min_shanten,
            best_shape,
            ukeire: None,
            wait: None,
            one_shanten: None,
            candidates: vec![],
            danger: vec![],
        };

        if size == 13 {
            let ukeire = analyzer.ukeire(hand, excluded, visible, best_shape)?;
            match min_shanten {
                0 => report.wait = Some(analyzer.classify_wait(hand, &ukeire)?),
                1 => report.one_shanten = Some(analyzer.classify_one_shanten(hand)?),
                _ => (),
            }
            report.ukeire = Some(ukeire);
        } else {
            report.candidates = analyzer.best_discards(hand, visible, excluded, config)?;
            if let Some(context) = &config.danger {
                report.danger = rank_by_safety(&hand.distinct_tiles(), context);
            }
        }
        Ok(report)
    }

    #[must_use]
    pub fn to_log_string(&self) -> String {
        let mut lines = vec![
            format!(
                "hand: {}{}",
                self.hand,
                self.excluded.map(|s| format!(" (excluding {s})")).unwrap_or_default()
            ),
            format!(
                "shanten: {}",
                self.shanten
                    .iter()
                    .map(|(shape, s)| format!("{shape} {s}"))
                    .collect::<Vec<_>>()
                    .join(" | ")
            ),
        ];
        if let Some(ukeire) = &self.ukeire {
            lines.push(format!("ukeire: {} ({ukeire})", ukeire.total()));
        }
        if let Some(wait) = self.wait {
            lines.push(format!("wait: {wait}"));
        }
        if let Some(shape) = self.one_shanten {
            lines.push(format!("one-shanten: {shape:?}"));
        }
        if !self.candidates.is_empty() {
            lines.push("candidates:".to_owned());
            lines.extend(self.candidates.iter().map(|c| format!("  {}", c.to_log_string())));
        }
        if !self.danger.is_empty() {
            lines.push(format!(
                "danger: {}",
                self.danger.iter().map(|d| d.to_short_string()).collect::<Vec<_>>().join(" ")
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::danger::DangerContext;
    use crate::t;

    #[test]
    fn thirteen_tiles() {
        let analyzer = Analyzer::new();
        let hand: Hand = "123456789m 1123p".parse().unwrap();
        let report = HandReport::analyze(&analyzer, &hand, &[], None, &EfficiencyConfig::default()).unwrap();
        assert_eq!(report.min_shanten, 0);
        assert_eq!(report.best_shape, ShapeKind::Standard);
        assert_eq!(report.shanten.len(), 3);
        assert_eq!(report.ukeire.as_ref().unwrap().total(), 6);
        assert_eq!(report.wait, Some(WaitPattern::TwoSided));
        assert!(report.candidates.is_empty());

        let log = report.to_log_string();
        assert!(log.starts_with("hand: 123456789m 1123p\n"));
        assert!(log.contains("ukeire: 6 (1p[2] 4p[4])"));
        assert!(log.contains("wait: TWO"));

        let pairs: Hand = "1122m 3344p 5566s E".parse().unwrap();
        let report = HandReport::analyze(&analyzer, &pairs, &[], None, &EfficiencyConfig::default()).unwrap();
        assert_eq!(report.best_shape, ShapeKind::SevenPairs);
        assert_eq!(report.wait, Some(WaitPattern::Pair));
    }

    #[test]
    fn fourteen_tiles() {
        let analyzer = Analyzer::new();
        let hand: Hand = "123456789m 1123p E".parse().unwrap();
        let config = EfficiencyConfig {
            danger: Some(DangerContext::default()),
            ..Default::default()
        };
        let report = HandReport::analyze(&analyzer, &hand, &[], None, &config).unwrap();
        assert!(report.ukeire.is_none());
        assert_eq!(report.candidates[0].tile, t!(E));
        assert_eq!(report.danger.len(), hand.distinct_tiles().len());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["hand"], "123456789m 1123p 1z");
        assert_eq!(json["min_shanten"], 0);
        assert_eq!(json["candidates"][0]["tile"], "E");
        assert!(json.get("wait").is_none());
        assert!(report.to_log_string().contains("candidates:\n  E "));
    }
}
