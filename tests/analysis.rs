use haiyomi::advice::{recommend_excluded_suit, shanten_without_suit};
use haiyomi::danger::{DangerContext, PlayerId};
use haiyomi::{Analyzer, EfficiencyConfig, Hand, ShapeKind, Suit, Tile};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn wall(rng: &mut ChaCha8Rng) -> Vec<Tile> {
    let mut wall = Tile::all().flat_map(|t| [t; 4]).collect::<Vec<_>>();
    wall.shuffle(rng);
    wall
}

fn random_hand(rng: &mut ChaCha8Rng, size: usize) -> (Hand, Vec<Tile>) {
    let wall = wall(rng);
    let hand = Hand::from_tiles(&wall[..size], 0).unwrap();
    (hand, wall[size..size + 12].to_vec())
}

fn random_complete(rng: &mut ChaCha8Rng) -> Hand {
    loop {
        let mut counts = [0_u8; 34];
        for _ in 0..4 {
            if rng.random_bool(0.5) {
                counts[rng.random_range(0..34)] += 3;
            } else {
                let suit = rng.random_range(0..3);
                let start = suit * 9 + rng.random_range(0..7);
                for c in &mut counts[start..start + 3] {
                    *c += 1;
                }
            }
        }
        counts[rng.random_range(0..34)] += 2;
        if let Ok(hand) = Hand::new(counts, 0) {
            return hand;
        }
    }
}

#[test]
fn complete_hands() {
    let analyzer = Analyzer::new();
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let hand = random_complete(&mut rng);
        assert_eq!(analyzer.shanten(&hand, ShapeKind::Standard).unwrap(), -1, "{hand}");
    }

    for _ in 0..50 {
        let mut kinds = Tile::all().collect::<Vec<_>>();
        kinds.shuffle(&mut rng);
        let tiles = kinds[..7].iter().flat_map(|&t| [t, t]).collect::<Vec<_>>();
        let hand = Hand::from_tiles(&tiles, 0).unwrap();
        assert_eq!(analyzer.shanten(&hand, ShapeKind::SevenPairs).unwrap(), -1, "{hand}");
    }
}

#[test]
fn ukeire_steps_down_once() {
    let analyzer = Analyzer::new();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for _ in 0..100 {
        let (hand, visible) = random_hand(&mut rng, 13);
        for shape in ShapeKind::ALL {
            let current = analyzer.shanten(&hand, shape).unwrap();
            let ukeire = analyzer.ukeire(&hand, None, &visible, shape).unwrap();
            for (tile, remaining) in ukeire.iter() {
                let seen = visible.iter().filter(|&&t| t == tile).count() as u8;
                assert!(remaining > 0);
                assert_eq!(remaining, 4 - hand.count(tile) - seen);
                let drawn = hand.with_tile(tile).unwrap();
                assert_eq!(analyzer.shanten(&drawn, shape).unwrap(), current - 1, "{hand} + {tile}");
            }
        }
    }
}

#[test]
fn cache_agrees_with_fresh_search() {
    let cached = Analyzer::new();
    let uncached = Analyzer::uncached();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    for i in 0..300 {
        let (hand, _) = random_hand(&mut rng, 13 + i % 2);
        for shape in ShapeKind::ALL {
            assert_eq!(
                cached.shanten(&hand, shape).unwrap(),
                uncached.shanten(&hand, shape).unwrap(),
                "{hand} {shape}"
            );
        }
        if i % 50 == 0 {
            cached.clear_cache();
        }
    }
}

#[test]
fn efficiency_bounds() {
    let analyzer = Analyzer::new();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let plain = EfficiencyConfig {
        peak_theory: false,
        ..Default::default()
    };
    for _ in 0..40 {
        let (hand, visible) = random_hand(&mut rng, 14);
        let scores = analyzer.best_discards(&hand, &visible, None, &EfficiencyConfig::default()).unwrap();
        assert_eq!(scores.len(), hand.distinct_tiles().len());
        assert!(scores.iter().all(|s| (0..=8).contains(&s.after_shanten)));
        assert!(scores.iter().all(|s| s.peak_bonus >= 0.0));

        let without = analyzer.best_discards(&hand, &visible, None, &plain).unwrap();
        let clear_winner = without.len() < 2
            || without[0].keeps_shanten != without[1].keeps_shanten
            || without[0].score - without[1].score > plain.tie_tolerance;
        if clear_winner {
            assert_eq!(scores[0].tile, without[0].tile, "{hand}");
        }
    }
}

#[test]
fn scenario_edge_of_nine() {
    let analyzer = Analyzer::new();
    let hand: Hand = "123456789m 1123p".parse().unwrap();
    assert_eq!(analyzer.shanten(&hand, ShapeKind::Standard).unwrap(), 0);
    let ukeire = analyzer.ukeire(&hand, None, &[], ShapeKind::Standard).unwrap();
    assert_eq!(ukeire.get(haiyomi::t!(4p)), Some(4));
}

#[test]
fn scenario_seven_pairs() {
    let analyzer = Analyzer::new();
    let hand: Hand = "1122m 3344p 5566s E".parse().unwrap();
    assert_eq!(analyzer.shanten(&hand, ShapeKind::SevenPairs).unwrap(), 0);
    let ukeire = analyzer.ukeire(&hand, None, &[], ShapeKind::SevenPairs).unwrap();
    assert_eq!(ukeire.tiles().collect::<Vec<_>>(), vec![haiyomi::t!(E)]);
    let done = hand.with_tile(haiyomi::t!(E)).unwrap();
    assert_eq!(analyzer.shanten(&done, ShapeKind::SevenPairs).unwrap(), -1);
}

#[test]
fn scenario_scattered() {
    let analyzer = Analyzer::new();
    let hand: Hand = "147m 147p 147s ESWN".parse().unwrap();
    assert_eq!(analyzer.shanten(&hand, ShapeKind::Standard).unwrap(), 8);
}

#[test]
fn scenario_excluded_suit_discard() {
    let analyzer = Analyzer::new();
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let plain = EfficiencyConfig {
        peak_theory: false,
        ..Default::default()
    };
    for _ in 0..40 {
        let (hand, _) = random_hand(&mut rng, 14);
        let suit = Suit::ALL[rng.random_range(0..3)];
        let scores = analyzer.best_discards(&hand, &[], Some(suit), &plain).unwrap();
        for (i, a) in scores.iter().enumerate() {
            for b in &scores[i + 1..] {
                // nothing in the same shanten class ranks above an excluded discard
                if b.in_excluded_suit && a.keeps_shanten == b.keeps_shanten {
                    assert!(a.in_excluded_suit, "{hand} {} above {}", a.tile, b.tile);
                }
            }
        }
    }
}

#[test]
fn recommended_suit_is_no_worse() {
    let analyzer = Analyzer::uncached();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for _ in 0..100 {
        let (hand, _) = random_hand(&mut rng, 14);
        let chosen = recommend_excluded_suit(&analyzer, &hand).unwrap();
        let best = shanten_without_suit(&analyzer, &hand, chosen).unwrap();
        for suit in Suit::ALL {
            assert!(best <= shanten_without_suit(&analyzer, &hand, suit).unwrap(), "{hand} {chosen} {suit}");
        }
    }
}

#[test]
fn danger_stays_bounded() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    for _ in 0..50 {
        let wall = wall(&mut rng);
        let history = wall[..24]
            .iter()
            .map(|&t| (t, rng.random_range(1..4) as PlayerId))
            .collect::<Vec<_>>();
        let context = DangerContext {
            visible: wall[..40].to_vec(),
            history,
            turn: rng.random_range(0..18),
            threat: rng.random_bool(0.5).then(|| rng.random_range(1..4)),
        };
        for tile in Tile::all() {
            let assessed = context.assess(tile);
            assert!((0.0..=1.0).contains(&assessed.level), "{tile} {}", assessed.level);
            assert_eq!(assessed.level == 0.0, assessed.reasons == [haiyomi::danger::DangerReason::Genbutsu]);
        }
    }
}
