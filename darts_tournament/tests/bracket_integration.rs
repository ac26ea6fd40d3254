//! Integration tests for bracket building and propagation
//!
//! Scenarios run against the public bracket API with positional seeding so
//! pairings are predictable.

use darts_tournament::{
    Bracket, BracketError, GameRules, IdAllocator, KnockoutMode, MatchStatus, Player, Score,
    Seeder,
    bracket::{
        BracketBuilder, BracketType, MAX_PROPAGATION_PASSES, NodeId, Round, SlotSource,
        enter_result, give_bye, stabilize, undo_bye,
    },
    rules::{RoundRules, SeedingMode},
};

fn players(n: i64) -> Vec<Player> {
    (1..=n).map(|id| Player::new(id, &format!("P{id}"))).collect()
}

fn rules(mode: KnockoutMode) -> GameRules {
    GameRules {
        seeding: SeedingMode::Positional,
        ..GameRules::knockout(mode, 2)
    }
}

fn build(mode: KnockoutMode, n: i64) -> Bracket {
    let rules = rules(mode);
    let mut seeder = Seeder::with_seed(99);
    let mut ids = IdAllocator::new();
    BracketBuilder::new(&rules, &mut seeder, &mut ids)
        .build(&players(n), &[])
        .unwrap()
}

fn legs() -> RoundRules {
    RoundRules::default()
}

fn winner_id(bracket: &Bracket, id: NodeId) -> Option<i64> {
    bracket.node(id)?.winner.as_ref().map(|p| p.id)
}

#[test]
fn test_five_player_scenario() {
    let bracket = build(KnockoutMode::SingleElimination, 5);

    // P = 8, three byes, one real first-round match.
    let first: Vec<_> = bracket
        .nodes_in_round(BracketType::Winner, Round::Quarterfinal)
        .collect();
    assert_eq!(first.len(), 4);
    assert_eq!(first[0].slot1.player.as_ref().map(|p| p.id), Some(1));
    assert_eq!(first[0].slot2.player.as_ref().map(|p| p.id), Some(2));
    for (bye, expected) in first[1..].iter().zip(3..=5) {
        assert_eq!(bye.status, MatchStatus::Bye);
        assert_eq!(bye.winner.as_ref().map(|p| p.id), Some(expected));
    }
    assert_eq!(bracket.winner_nodes.len(), 7);
    assert_eq!(bracket.rounds(BracketType::Winner).last(), Some(&Round::Final));

    // The second semifinal already has both bye winners.
    let semis: Vec<_> = bracket
        .nodes_in_round(BracketType::Winner, Round::Semifinal)
        .collect();
    assert!(!semis[0].has_both_players());
    assert!(semis[1].has_both_players());
}

#[test]
fn test_every_node_resolvable() {
    for n in 2..=40 {
        let bracket = build(KnockoutMode::SingleElimination, n);
        let field = (n as usize).next_power_of_two();
        assert_eq!(bracket.winner_nodes.len(), field - 1, "{n} players");
        for node in bracket.nodes() {
            let resolvable = node.slots().iter().all(|s| s.player.is_some() || s.source.is_some());
            let single_winner_bye = node.status == MatchStatus::Bye && node.winner.is_some();
            assert!(resolvable || single_winner_bye, "{n} players, node {}", node.id);
        }
    }
}

#[test]
fn test_double_elimination_full_run() {
    let mut bracket = build(KnockoutMode::DoubleElimination, 4);
    let semis: Vec<NodeId> = bracket
        .nodes_in_round(BracketType::Winner, Round::Semifinal)
        .map(|n| n.id)
        .collect();

    enter_result(&mut bracket, semis[0], Score::legs(3, 1), &legs()).unwrap();
    enter_result(&mut bracket, semis[1], Score::legs(2, 3), &legs()).unwrap();

    let final_id = bracket.winner_final().unwrap().id;
    let loser_final = bracket.loser_final().unwrap().id;
    assert_eq!(
        bracket.node(loser_final).unwrap().sources().collect::<Vec<_>>(),
        vec![SlotSource::loser_of(semis[0]), SlotSource::loser_of(semis[1])]
    );

    enter_result(&mut bracket, final_id, Score::legs(3, 2), &legs()).unwrap();
    enter_result(&mut bracket, loser_final, Score::legs(1, 3), &legs()).unwrap();
    assert_eq!(winner_id(&bracket, final_id), Some(1));
    assert_eq!(winner_id(&bracket, loser_final), Some(3));

    let grand_final = bracket.grand_final().unwrap().id;
    assert!(bracket.node(grand_final).unwrap().has_both_players());
    enter_result(&mut bracket, grand_final, Score::legs(0, 3), &legs()).unwrap();

    assert!(bracket.is_complete());
    assert_eq!(bracket.champion().map(|p| p.id), Some(3));
}

#[test]
fn test_give_bye_with_two_players_needs_winner() {
    let mut bracket = build(KnockoutMode::DoubleElimination, 8);
    let first = bracket.playable_nodes().next().unwrap().id;
    let snapshot = bracket.clone();

    assert_eq!(
        give_bye(&mut bracket, first, None),
        Err(BracketError::WinnerRequired(first))
    );
    assert_eq!(bracket, snapshot);
}

#[test]
fn test_manual_bye_loser_drops_down() {
    let mut bracket = build(KnockoutMode::DoubleElimination, 4);
    let semi = bracket
        .nodes_in_round(BracketType::Winner, Round::Semifinal)
        .next()
        .unwrap()
        .id;

    give_bye(&mut bracket, semi, Some(2)).unwrap();
    let loser_final = bracket.loser_final().unwrap();
    assert_eq!(loser_final.slot1.player.as_ref().map(|p| p.id), Some(1));

    let after_give = bracket.clone();
    undo_bye(&mut bracket, semi).unwrap();
    assert!(bracket.loser_final().unwrap().slot1.player.is_none());
    give_bye(&mut bracket, semi, Some(2)).unwrap();
    assert_eq!(bracket, after_give);
}

#[test]
fn test_correction_blocked_after_dependent_played() {
    let mut bracket = build(KnockoutMode::SingleElimination, 4);
    let semis: Vec<NodeId> = bracket
        .nodes_in_round(BracketType::Winner, Round::Semifinal)
        .map(|n| n.id)
        .collect();
    enter_result(&mut bracket, semis[0], Score::legs(3, 0), &legs()).unwrap();
    enter_result(&mut bracket, semis[1], Score::legs(3, 0), &legs()).unwrap();
    let final_id = bracket.winner_final().unwrap().id;
    enter_result(&mut bracket, final_id, Score::legs(3, 0), &legs()).unwrap();

    let snapshot = bracket.clone();
    assert_eq!(
        enter_result(&mut bracket, semis[0], Score::legs(0, 3), &legs()),
        Err(BracketError::DependentsProgressed {
            node: semis[0],
            dependent: final_id
        })
    );
    assert_eq!(bracket, snapshot);
}

#[test]
fn test_propagation_is_idempotent_after_results() {
    let mut bracket = build(KnockoutMode::DoubleElimination, 7);
    loop {
        let next = bracket.playable_nodes().next().map(|n| n.id);
        let Some(id) = next else { break };
        enter_result(&mut bracket, id, Score::legs(3, 1), &legs()).unwrap();
        let settled = bracket.clone();
        let outcome = stabilize(&mut bracket);
        assert_eq!(bracket, settled);
        assert!(outcome.converged);
        assert!(outcome.passes <= MAX_PROPAGATION_PASSES);
    }
    assert!(bracket.is_complete());
    assert!(bracket.champion().is_some());
}
