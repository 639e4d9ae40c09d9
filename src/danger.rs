//! Deal-in danger of a discard, estimated from the discard piles.
//! Intended to explain a defensive choice, not to read exact waits.

use crate::hand::count_tiles;
use crate::tile::{Tile, TileKind};
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Seat of an opponent, as used in discard history.
pub type PlayerId = u8;

/// Only this many of the latest discards prove suji.
const SUJI_WINDOW: usize = 10;
/// Discards made before this turn count as early.
const EARLY_TURN: u32 = 5;
const EARLY_DISCARDS: usize = 5;
const EARLY_RANGE: u8 = 2;

const SUJI_FACTOR: f32 = 0.7;
const KABE_FACTOR: f32 = 0.3;
const NEAR_KABE_FACTOR: f32 = 0.8;
const EARLY_FACTOR: f32 = 0.6;
const FRESH_PENALTY: f32 = 0.2;

/// Why a tile got the danger it did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DangerReason {
    /// already discarded, safe
    Genbutsu,
    /// a tile three ranks away was discarded recently
    Suji,
    /// every copy of the tile or of its neighbors is visible
    Kabe,
    /// three copies of the tile are visible
    NearKabe,
    /// a nearby tile was let go in the first discards
    EarlyDiscard,
    /// nobody has discarded it yet
    Fresh,
    /// rank 3 to 7
    MiddleTile,
    Terminal,
    Dragon,
}

impl DangerReason {
    pub fn to_acronym(self) -> &'static str {
        match self {
            DangerReason::Genbutsu => "G",
            DangerReason::Suji => "SJ",
            DangerReason::Kabe => "KB",
            DangerReason::NearKabe => "NK",
            DangerReason::EarlyDiscard => "ED",
            DangerReason::Fresh => "FR",
            DangerReason::MiddleTile => "MID",
            DangerReason::Terminal => "T",
            DangerReason::Dragon => "D",
        }
    }
}

/// Table knowledge needed to judge danger.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DangerContext {
    /// Discards of every opponent in the order they were made.
    pub history: Vec<(Tile, PlayerId)>,
    /// Every copy visible on the table, discards included.
    pub visible: Vec<Tile>,
    pub turn: u32,
    /// The opponent to defend against. `None` defends against everyone.
    pub threat: Option<PlayerId>,
}

/// Danger of one tile with the reasons behind it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TileDanger {
    pub tile: Tile,
    pub level: f32,
    pub reasons: Vec<DangerReason>,
}

impl TileDanger {
    pub fn to_short_string(&self) -> String {
        format!(
            "{}:{:.2}{}",
            self.tile,
            self.level,
            if self.reasons.is_empty() {
                "".to_owned()
            } else {
                format!(
                    "({})",
                    self.reasons.iter().map(|r| r.to_acronym()).collect::<Vec<_>>().join(",")
                )
            }
        )
    }
}

impl DangerContext {
    #[must_use]
    pub fn assess(&self, tile: Tile) -> TileDanger {
        assess(tile, &self.history, &self.visible, self.turn, self.threat)
    }

    #[must_use]
    pub fn level(&self, tile: Tile) -> f32 {
        self.assess(tile).level
    }
}

/// Danger in `[0, 1]` of discarding `tile` against the whole table.
#[must_use]
pub fn danger_level(tile: Tile, history: &[(Tile, PlayerId)], visible: &[Tile], turn: u32) -> f32 {
    assess(tile, history, visible, turn, None).level
}

/// Same as [`danger_level`] but only `opponent`'s discards prove safety.
#[must_use]
pub fn danger_level_against(
    tile: Tile,
    history: &[(Tile, PlayerId)],
    visible: &[Tile],
    turn: u32,
    opponent: PlayerId,
) -> f32 {
    assess(tile, history, visible, turn, Some(opponent)).level
}

#[must_use]
pub fn danger_reasons(
    tile: Tile,
    history: &[(Tile, PlayerId)],
    visible: &[Tile],
    turn: u32,
    threat: Option<PlayerId>,
) -> Vec<DangerReason> {
    assess(tile, history, visible, turn, threat).reasons
}

/// `tiles` from safest to most dangerous. Equal danger keeps the usual
/// discard order (honors, then terminals, then toward the middle).
#[must_use]
pub fn rank_by_safety(tiles: &[Tile], context: &DangerContext) -> Vec<TileDanger> {
    let mut ranked = tiles.iter().map(|&tile| context.assess(tile)).collect::<Vec<_>>();
    ranked.sort_by(|a, b| match a.level.total_cmp(&b.level) {
        Ordering::Equal => b.tile.cmp_discard_priority(a.tile),
        o => o,
    });
    ranked.dedup_by_key(|d| d.tile);
    ranked
}

fn assess(
    tile: Tile,
    history: &[(Tile, PlayerId)],
    visible: &[Tile],
    turn: u32,
    threat: Option<PlayerId>,
) -> TileDanger {
    let mut reasons = vec![];
    let by_threat = history
        .iter()
        .filter(|(_, player)| threat.is_none_or(|threat| *player == threat))
        .map(|&(discard, _)| discard)
        .collect::<Vec<_>>();

    if by_threat.contains(&tile) {
        return TileDanger {
            tile,
            level: 0.0,
            reasons: vec![DangerReason::Genbutsu],
        };
    }

    let mut level = match tile.kind() {
        TileKind::Numbered { rank, .. } => match rank {
            4..=6 => 0.7,
            3 | 7 => 0.5,
            2 | 8 => 0.3,
            _ => 0.1,
        },
        TileKind::Honor(honor) if honor.is_dragon() => 0.6,
        TileKind::Honor(_) => 0.3,
    };
    match tile.rank() {
        Some(3..=7) => reasons.push(DangerReason::MiddleTile),
        Some(1 | 9) => reasons.push(DangerReason::Terminal),
        Some(_) => (),
        None if tile.is_dragon() => reasons.push(DangerReason::Dragon),
        None => (),
    }

    if let Some(rank) = tile.rank() {
        let recent = &by_threat[by_threat.len().saturating_sub(SUJI_WINDOW)..];
        let suji = recent
            .iter()
            .any(|d| d.suit() == tile.suit() && d.rank().is_some_and(|r| r.abs_diff(rank) == 3));
        if suji {
            level *= SUJI_FACTOR;
            reasons.push(DangerReason::Suji);
        }
    }

    let seen = count_tiles(visible);
    let walled = |t: Tile| seen[t.as_usize()] >= 4;
    let neighbors = [tile.offset(-1), tile.offset(1)].into_iter().flatten().collect::<Vec<_>>();
    if walled(tile) || (!neighbors.is_empty() && neighbors.iter().all(|&n| walled(n))) {
        level *= KABE_FACTOR;
        reasons.push(DangerReason::Kabe);
    } else if seen[tile.as_usize()] == 3 {
        level *= NEAR_KABE_FACTOR;
        reasons.push(DangerReason::NearKabe);
    }

    if turn <= EARLY_TURN
        && let Some(rank) = tile.rank()
    {
        let early = by_threat
            .iter()
            .take(EARLY_DISCARDS)
            .any(|d| d.suit() == tile.suit() && d.rank().is_some_and(|r| r.abs_diff(rank) <= EARLY_RANGE));
        if early {
            level *= EARLY_FACTOR;
            reasons.push(DangerReason::EarlyDiscard);
        }
    }

    if history.iter().all(|&(discard, _)| discard != tile) {
        level += FRESH_PENALTY;
        reasons.push(DangerReason::Fresh);
    }

    TileDanger {
        tile,
        level: level.clamp(0.0, 1.0),
        reasons,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::t;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn genbutsu() {
        let history = [(t!(5m), 1), (t!(E), 2)];
        assert_eq!(danger_level(t!(5m), &history, &[], 8), 0.0);
        assert_eq!(danger_level_against(t!(E), &history, &[], 8, 2), 0.0);
        // discarded by someone else only
        assert!(close(danger_level_against(t!(5m), &history, &[], 8, 2), 0.7));
        assert_eq!(danger_reasons(t!(5m), &history, &[], 8, None), vec![DangerReason::Genbutsu]);
    }

    #[test]
    fn base_values() {
        assert!(close(danger_level(t!(5m), &[], &[], 8), 0.9));
        assert!(close(danger_level(t!(3p), &[], &[], 8), 0.7));
        assert!(close(danger_level(t!(8s), &[], &[], 8), 0.5));
        assert!(close(danger_level(t!(1m), &[], &[], 8), 0.3));
        assert!(close(danger_level(t!(C), &[], &[], 8), 0.8));
        assert!(close(danger_level(t!(E), &[], &[], 8), 0.5));
        assert_eq!(
            danger_reasons(t!(C), &[], &[], 8, None),
            vec![DangerReason::Dragon, DangerReason::Fresh]
        );
    }

    #[test]
    fn suji() {
        let history = [(t!(2m), 1)];
        assert!(close(danger_level(t!(5m), &history, &[], 8), 0.7 * 0.7 + 0.2));
        // the suji tile was discarded by another opponent
        assert!(close(danger_level_against(t!(5m), &history, &[], 8, 3), 0.9));
        // too old to count
        let mut history = vec![(t!(2m), 1)];
        history.extend(std::iter::repeat_n((t!(E), 1), SUJI_WINDOW));
        assert!(close(danger_level(t!(5m), &history, &[], 8), 0.9));
    }

    #[test]
    fn kabe() {
        let visible = t![5m, 5m, 5m,];
        assert!(close(danger_level(t!(5m), &[], &visible, 8), 0.7 * 0.8 + 0.2));
        let visible = t![2m, 2m, 2m, 2m,];
        assert!(close(danger_level(t!(1m), &[], &visible, 8), 0.1 * 0.3 + 0.2));
        // only one side walled
        assert!(close(danger_level(t!(3m), &[], &visible, 8), 0.7));
        let visible = t![2m, 2m, 2m, 2m, 4m, 4m, 4m, 4m,];
        assert_eq!(
            danger_reasons(t!(3m), &[], &visible, 8, None),
            vec![DangerReason::MiddleTile, DangerReason::Kabe, DangerReason::Fresh]
        );
    }

    #[test]
    fn early() {
        let history = [(t!(4m), 1)];
        assert!(close(danger_level_against(t!(5m), &history, &[], 3, 1), 0.7 * 0.6 + 0.2));
        assert!(close(danger_level_against(t!(5m), &history, &[], 6, 1), 0.9));
        assert!(close(danger_level_against(t!(8m), &history, &[], 3, 1), 0.5));
    }

    #[test]
    fn bounded() {
        let context = DangerContext {
            history: vec![(t!(1m), 1), (t!(9p), 2), (t!(4s), 1)],
            visible: t![1m, 9p, 4s, 5s, 5s, 5s, 5s,].to_vec(),
            turn: 4,
            threat: None,
        };
        for tile in Tile::all() {
            let level = context.level(tile);
            assert!((0.0..=1.0).contains(&level), "{tile} {level}");
        }
    }

    #[test]
    fn safety_order() {
        let context = DangerContext::default();
        let ranked = rank_by_safety(&t![5m, E, 1m, C, 5m,], &context);
        assert_eq!(ranked.iter().map(|d| d.tile).collect::<Vec<_>>(), t![1m, E, C, 5m,]);
        assert_eq!(ranked[0].to_short_string(), "1m:0.30(T,FR)");
    }
}
