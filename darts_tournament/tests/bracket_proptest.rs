/// Property-based tests for bracket construction and propagation
///
/// These tests check the structural guarantees of generated brackets and
/// the bye/undo round trip across random field sizes and seeds.
use darts_tournament::{
    Bracket, GameRules, IdAllocator, KnockoutMode, MatchStatus, Player, Score, Seeder,
    bracket::{BracketBuilder, BracketType, enter_result, give_bye, stabilize, undo_bye},
    group::generate_round_robin,
    rules::RoundRules,
};
use proptest::prelude::*;

fn players(n: usize) -> Vec<Player> {
    (1..=n as i64)
        .map(|id| Player::new(id, &format!("P{id}")))
        .collect()
}

fn build(mode: KnockoutMode, n: usize, seed: u64) -> Bracket {
    let rules = GameRules::knockout(mode, 2);
    let mut seeder = Seeder::with_seed(seed);
    let mut ids = IdAllocator::new();
    BracketBuilder::new(&rules, &mut seeder, &mut ids)
        .build(&players(n), &[])
        .unwrap()
}

// Strategy for the knockout mode
fn mode_strategy() -> impl Strategy<Value = KnockoutMode> {
    prop_oneof![
        Just(KnockoutMode::SingleElimination),
        Just(KnockoutMode::DoubleElimination),
    ]
}

proptest! {
    #[test]
    fn winner_bracket_has_field_minus_one_nodes(n in 2usize..=64, seed in any::<u64>()) {
        let bracket = build(KnockoutMode::SingleElimination, n, seed);
        prop_assert_eq!(bracket.winner_nodes.len(), n.next_power_of_two() - 1);
        prop_assert!(bracket.winner_final().is_some());
        prop_assert!(bracket.loser_nodes.is_empty());
    }

    #[test]
    fn every_qualifier_appears_once_in_first_round(n in 2usize..=64, seed in any::<u64>()) {
        let bracket = build(KnockoutMode::SingleElimination, n, seed);
        let first_round = bracket.winner_nodes[0].round;
        let mut seen: Vec<i64> = bracket
            .nodes_in_round(BracketType::Winner, first_round)
            .flat_map(|node| node.slots().into_iter().filter_map(|s| s.player.as_ref().map(|p| p.id)).collect::<Vec<_>>())
            .collect();
        seen.sort_unstable();
        let expected: Vec<i64> = (1..=n as i64).collect();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn sources_point_backwards(mode in mode_strategy(), n in 2usize..=48, seed in any::<u64>()) {
        let bracket = build(mode, n, seed);
        for node in bracket.nodes() {
            for source in node.sources() {
                prop_assert!(source.node < node.id);
                prop_assert!(bracket.node(source.node).is_some());
            }
        }
    }

    #[test]
    fn stabilize_is_idempotent(mode in mode_strategy(), n in 2usize..=48, seed in any::<u64>()) {
        let mut bracket = build(mode, n, seed);
        let settled = bracket.clone();
        let outcome = stabilize(&mut bracket);
        prop_assert!(outcome.converged);
        prop_assert_eq!(outcome.changes, 0);
        prop_assert_eq!(bracket, settled);
    }

    #[test]
    fn brackets_always_finish(mode in mode_strategy(), n in 2usize..=32, seed in any::<u64>(), flips in prop::collection::vec(any::<bool>(), 128)) {
        let mut bracket = build(mode, n, seed);
        let rules = RoundRules::default();
        let mut step = 0;
        loop {
            let next = bracket.playable_nodes().next().map(|node| node.id);
            let Some(id) = next else { break };
            let score = if flips[step % flips.len()] { Score::legs(3, 1) } else { Score::legs(0, 3) };
            enter_result(&mut bracket, id, score, &rules).unwrap();
            step += 1;
        }
        prop_assert!(bracket.is_complete());
        prop_assert!(bracket.champion().is_some());
        prop_assert!(bracket.nodes().all(|node| node.status != MatchStatus::NotStarted));
    }

    #[test]
    fn undo_then_give_restores_state(mode in mode_strategy(), n in 2usize..=32, seed in any::<u64>(), pick in any::<bool>()) {
        let mut bracket = build(mode, n, seed);
        let node = bracket.playable_nodes().next().map(|node| {
            let winner = if pick { &node.slot1 } else { &node.slot2 };
            (node.id, winner.player.as_ref().map(|p| p.id))
        });
        let (id, winner) = node.unwrap();

        let before = bracket.clone();
        give_bye(&mut bracket, id, winner).unwrap();
        let given = bracket.clone();

        // Automatic byes that only took over the dropped loser reopen too.
        undo_bye(&mut bracket, id).unwrap();
        prop_assert_eq!(&bracket, &before);
        give_bye(&mut bracket, id, winner).unwrap();
        prop_assert_eq!(bracket, given);
    }

    #[test]
    fn round_robin_counts(n in 0usize..=20) {
        let mut ids = IdAllocator::new();
        let matches = generate_round_robin(&players(n), &mut ids, false);
        let real = matches.iter().filter(|m| !m.is_bye()).count();
        let byes = matches.len() - real;
        prop_assert_eq!(real, n * n.saturating_sub(1) / 2);
        prop_assert_eq!(byes, if n % 2 == 1 { n } else { 0 });
    }
}
