//! Integration tests for full tournament runs
//!
//! These tests drive a class from registration through every configured
//! phase to its champion.

use darts_tournament::{
    GameRules, KnockoutMode, PhaseType, PostGroupPhaseMode, Score, TournamentClass,
    TournamentError, bracket::BracketType, entities::MatchStatus, rules::SeedingMode,
};

fn class_with(players: usize, groups: usize, rules: GameRules, seed: u64) -> TournamentClass {
    let mut class = TournamentClass::new("Integration", rules)
        .unwrap()
        .with_seed(seed);
    for idx in 0..players {
        class.register_player(&format!("Player {idx:02}")).unwrap();
    }
    class.create_groups(groups).unwrap();
    class
}

/// Player 1 of every open group match wins 3:1.
fn play_groups(class: &mut TournamentClass) {
    let ids: Vec<u64> = class
        .current_phase()
        .unwrap()
        .groups()
        .iter()
        .flat_map(|g| g.matches.iter().filter(|m| !m.is_terminal()).map(|m| m.id))
        .collect();
    for id in ids {
        class.enter_result(id, Score::legs(3, 1)).unwrap();
    }
}

/// Play every playable bracket node until nothing is left; player 1 wins.
fn play_bracket(class: &mut TournamentClass) -> usize {
    let mut played = 0;
    loop {
        let next = class
            .bracket()
            .and_then(|b| b.playable_nodes().next())
            .map(|n| n.id);
        let Some(id) = next else {
            return played;
        };
        let outcome = class.enter_result(id, Score::legs(3, 0)).unwrap();
        assert!(outcome.is_some_and(|o| o.converged));
        played += 1;
    }
}

#[test]
fn test_group_only_class() {
    let mut class = class_with(5, 1, GameRules::default(), 1);
    assert!(!class.is_finished());
    play_groups(&mut class);

    assert!(class.is_finished());
    assert!(!class.can_advance());
    let champion = class.champion().unwrap();
    let group_id = class.phases()[0].groups()[0].id;
    assert_eq!(class.standings(group_id).unwrap()[0].player, champion);
}

#[test]
fn test_groups_into_single_elimination() {
    let rules = GameRules::knockout(KnockoutMode::SingleElimination, 2);
    let mut class = class_with(12, 3, rules, 2);
    play_groups(&mut class);
    assert_eq!(class.advance().unwrap(), PhaseType::KnockoutPhase);

    // 6 qualifiers padded to 8: four first-round nodes (two byes), two semis, one final.
    let bracket = class.bracket().unwrap();
    assert_eq!(bracket.winner_nodes.len(), 7);
    assert_eq!(
        bracket
            .winner_nodes
            .iter()
            .filter(|n| n.status == MatchStatus::Bye)
            .count(),
        2
    );

    let played = play_bracket(&mut class);
    assert_eq!(played, 5);
    assert!(class.is_finished());
    assert!(class.champion().is_some());
}

#[test]
fn test_double_elimination_runs_to_grand_final() {
    let mut rules = GameRules::knockout(KnockoutMode::DoubleElimination, 2);
    rules.include_group_phase_losers_bracket = true;
    let mut class = class_with(9, 3, rules, 3);
    play_groups(&mut class);
    class.advance().unwrap();

    let bracket = class.bracket().unwrap();
    assert!(bracket.grand_final().is_some());
    assert!(
        bracket
            .loser_nodes
            .iter()
            .any(|n| n.players().count() == 2 && n.bracket_type == BracketType::Loser)
    );

    play_bracket(&mut class);
    let bracket = class.bracket().unwrap();
    assert!(bracket.is_complete());
    assert_eq!(
        class.champion().as_ref(),
        bracket.grand_final().unwrap().winner.as_ref()
    );
}

#[test]
fn test_round_robin_finals_champion() {
    let mut rules = GameRules::round_robin_finals(1);
    rules.seeding = SeedingMode::Positional;
    let mut class = class_with(8, 4, rules, 4);
    play_groups(&mut class);

    assert_eq!(class.advance().unwrap(), PhaseType::RoundRobinFinals);
    assert_eq!(class.current_phase().unwrap().groups()[0].players.len(), 4);
    assert!(!class.is_finished());

    play_groups(&mut class);
    assert!(class.is_finished());
    assert!(class.champion().is_some());
}

#[test]
fn test_completed_phase_results_are_frozen() {
    let mut class = class_with(4, 1, GameRules::round_robin_finals(2), 5);
    let group_match = class.phases()[0].groups()[0].matches[0].id;
    play_groups(&mut class);
    class.advance().unwrap();

    assert!(matches!(
        class.enter_result(group_match, Score::legs(0, 3)),
        Err(TournamentError::WrongPhase {
            actual: PhaseType::RoundRobinFinals
        })
    ));
}

#[test]
fn test_reset_and_replay() {
    let rules = GameRules::knockout(KnockoutMode::SingleElimination, 2);
    let mut class = class_with(8, 2, rules, 6);
    play_groups(&mut class);
    class.advance().unwrap();
    play_bracket(&mut class);
    assert!(class.is_finished());

    class.reset_to_group_phase();
    assert_eq!(class.phases().len(), 1);
    assert!(class.bracket().is_none());
    assert!(class.can_advance());

    class.rules.post_group_phase_mode = PostGroupPhaseMode::RoundRobinFinals;
    assert_eq!(class.advance().unwrap(), PhaseType::RoundRobinFinals);
}

#[test]
fn test_bye_management_through_class() {
    let mut rules = GameRules::knockout(KnockoutMode::SingleElimination, 2);
    rules.seeding = SeedingMode::Positional;
    let mut class = class_with(8, 2, rules, 7);
    play_groups(&mut class);
    class.advance().unwrap();

    let semi = class
        .bracket()
        .unwrap()
        .playable_nodes()
        .next()
        .map(|n| (n.id, n.slot2.player.clone().unwrap().id))
        .unwrap();

    let before = class.bracket().unwrap().clone();
    assert!(matches!(
        class.give_bye(semi.0, None),
        Err(TournamentError::Bracket(_))
    ));
    assert_eq!(class.bracket().unwrap(), &before);

    class.give_bye(semi.0, Some(semi.1)).unwrap();
    let after = class.bracket().unwrap().clone();
    class.undo_bye(semi.0).unwrap();
    assert_eq!(class.bracket().unwrap(), &before);
    class.give_bye(semi.0, Some(semi.1)).unwrap();
    assert_eq!(class.bracket().unwrap(), &after);
}
