//! Bracket construction for single and double elimination.

use crate::entities::{IdAllocator, MatchStatus, Player};
use crate::rules::{ConfigurationError, GameRules, KnockoutMode};
use crate::seeding::Seeder;

use super::models::{
    Bracket, BracketMatchNode, BracketType, MAX_LOSER_ROUND, NodeId, Round, Slot, SlotSource,
};
use super::propagation::stabilize;

/// Smallest field a bracket can be built for.
pub const MIN_BRACKET_PLAYERS: usize = 2;

/// Builds linked bracket graphs from a list of qualifiers.
///
/// Node ids come from the tournament's allocator in creation order; every
/// node is created after the nodes it reads from.
pub struct BracketBuilder<'a> {
    rules: &'a GameRules,
    seeder: &'a mut Seeder,
    ids: &'a mut IdAllocator,
}

impl<'a> BracketBuilder<'a> {
    pub fn new(rules: &'a GameRules, seeder: &'a mut Seeder, ids: &'a mut IdAllocator) -> Self {
        Self { rules, seeder, ids }
    }

    /// Build the bracket selected by the configured knockout mode.
    ///
    /// `group_losers` only matters for double elimination with the group
    /// phase losers bracket enabled.
    pub fn build(
        &mut self,
        qualifiers: &[Player],
        group_losers: &[Player],
    ) -> Result<Bracket, ConfigurationError> {
        match self.rules.knockout_mode {
            KnockoutMode::SingleElimination => self.single_elimination(qualifiers),
            KnockoutMode::DoubleElimination => self.double_elimination(qualifiers, group_losers),
        }
    }

    /// Single elimination bracket, padded with first-round byes up to the
    /// next power of two.
    pub fn single_elimination(&mut self, qualifiers: &[Player]) -> Result<Bracket, ConfigurationError> {
        let mut bracket = Bracket::new();
        self.winner_bracket(&mut bracket, qualifiers)?;
        stabilize(&mut bracket);

        log::info!(
            "Built single elimination bracket for {} players ({} nodes)",
            qualifiers.len(),
            bracket.len()
        );
        Ok(bracket)
    }

    /// Winner bracket plus loser bracket and Grand Final.
    pub fn double_elimination(
        &mut self,
        qualifiers: &[Player],
        group_losers: &[Player],
    ) -> Result<Bracket, ConfigurationError> {
        let mut bracket = Bracket::new();
        let winner_rounds = self.winner_bracket(&mut bracket, qualifiers)?;

        let seeded_losers = if self.rules.include_group_phase_losers_bracket {
            group_losers
        } else {
            &[]
        };
        self.loser_bracket(&mut bracket, &winner_rounds, seeded_losers);

        let finals = (
            bracket.winner_final().map(|n| n.id),
            bracket.loser_final().map(|n| n.id),
        );
        if let (Some(winner_final), Some(loser_final)) = finals {
            self.push_node(
                &mut bracket,
                BracketType::Winner,
                Round::GrandFinal,
                0,
                Slot::from_source(SlotSource::winner_of(winner_final)),
                Slot::from_source(SlotSource::winner_of(loser_final)),
            );
        }

        stabilize(&mut bracket);

        log::info!(
            "Built double elimination bracket for {} players ({} winner nodes, {} loser nodes)",
            qualifiers.len(),
            bracket.winner_nodes.len(),
            bracket.loser_nodes.len()
        );
        Ok(bracket)
    }

    /// Create the winner bracket and return its node ids round by round.
    fn winner_bracket(
        &mut self,
        bracket: &mut Bracket,
        qualifiers: &[Player],
    ) -> Result<Vec<Vec<NodeId>>, ConfigurationError> {
        let count = qualifiers.len();
        if count < MIN_BRACKET_PLAYERS {
            return Err(ConfigurationError::InsufficientQualifiers {
                needed: MIN_BRACKET_PLAYERS,
                current: count,
            });
        }

        let field = count.next_power_of_two();
        let byes = field - count;
        let real_matches = (count - byes) / 2;
        let ordered = self.seeder.order(qualifiers, self.rules.seeding);
        let first_round = Round::for_field_size(field);

        let mut rounds = Vec::new();
        let mut current = Vec::with_capacity(field / 2);

        for (position, pair) in ordered[..real_matches * 2].chunks(2).enumerate() {
            let id = self.push_node(
                bracket,
                BracketType::Winner,
                first_round,
                position,
                Slot::with_player(pair[0].clone()),
                Slot::with_player(pair[1].clone()),
            );
            current.push(id);
        }
        for (offset, player) in ordered[real_matches * 2..].iter().enumerate() {
            let id = self.push_bye(
                bracket,
                BracketType::Winner,
                first_round,
                real_matches + offset,
                player.clone(),
            );
            current.push(id);
        }

        while current.len() > 1 {
            let round = Round::for_field_size(current.len());
            let next: Vec<NodeId> = current
                .chunks(2)
                .enumerate()
                .map(|(position, pair)| {
                    self.push_node(
                        bracket,
                        BracketType::Winner,
                        round,
                        position,
                        Slot::from_source(SlotSource::winner_of(pair[0])),
                        Slot::from_source(SlotSource::winner_of(pair[1])),
                    )
                })
                .collect();
            rounds.push(std::mem::replace(&mut current, next));
        }
        rounds.push(current);

        Ok(rounds)
    }

    /// Create the loser bracket fed by every winner round but the final.
    fn loser_bracket(&mut self, bracket: &mut Bracket, winner_rounds: &[Vec<NodeId>], group_losers: &[Player]) {
        let mut counter = LoserRoundCounter::default();
        let mut survivors: Vec<SlotSource> = Vec::new();

        if !group_losers.is_empty() {
            let round = counter.round();
            for (position, pair) in group_losers.chunks(2).enumerate() {
                let id = match pair {
                    [first, second] => self.push_node(
                        bracket,
                        BracketType::Loser,
                        round,
                        position,
                        Slot::with_player(first.clone()),
                        Slot::with_player(second.clone()),
                    ),
                    _ => self.push_bye(bracket, BracketType::Loser, round, position, pair[0].clone()),
                };
                survivors.push(SlotSource::winner_of(id));
            }
            counter.used = true;
        }

        let feeding_rounds = winner_rounds.len().saturating_sub(1);
        for round_nodes in &winner_rounds[..feeding_rounds] {
            counter.advance_if_used();

            let dropped: Vec<SlotSource> = round_nodes.iter().copied().map(SlotSource::loser_of).collect();
            let entrants = interleave(&survivors, &dropped);
            survivors = self.loser_round(bracket, counter.round(), &entrants);
            counter.used = !survivors.is_empty();
        }

        while survivors.len() > 1 {
            counter.advance_if_used();
            let entrants = std::mem::take(&mut survivors);
            survivors = self.loser_round(bracket, counter.round(), &entrants);
        }

        if let Some(last) = bracket.loser_nodes.last_mut() {
            last.round = Round::LoserFinal;
            last.uses_sets = self.rules.round_rules(Round::LoserFinal).play_with_sets;
        }
    }

    /// Pair `entrants` consecutively; an odd one out gets a bye node.
    fn loser_round(&mut self, bracket: &mut Bracket, round: Round, entrants: &[SlotSource]) -> Vec<SlotSource> {
        entrants
            .chunks(2)
            .enumerate()
            .map(|(position, pair)| {
                let second = pair.get(1).copied().map_or_else(Slot::empty, Slot::from_source);
                let id = self.push_node(
                    bracket,
                    BracketType::Loser,
                    round,
                    position,
                    Slot::from_source(pair[0]),
                    second,
                );
                SlotSource::winner_of(id)
            })
            .collect()
    }

    fn push_node(
        &mut self,
        bracket: &mut Bracket,
        bracket_type: BracketType,
        round: Round,
        position: usize,
        slot1: Slot,
        slot2: Slot,
    ) -> NodeId {
        let id = self.ids.allocate();
        let uses_sets = self.rules.round_rules(round).play_with_sets;
        let node = BracketMatchNode::new(id, bracket_type, round, position, slot1, slot2, uses_sets);
        match bracket_type {
            BracketType::Winner => bracket.winner_nodes.push(node),
            BracketType::Loser => bracket.loser_nodes.push(node),
        }
        id
    }

    /// A node holding a single known player who advances immediately.
    fn push_bye(
        &mut self,
        bracket: &mut Bracket,
        bracket_type: BracketType,
        round: Round,
        position: usize,
        player: Player,
    ) -> NodeId {
        let id = self.push_node(
            bracket,
            bracket_type,
            round,
            position,
            Slot::with_player(player.clone()),
            Slot::empty(),
        );
        if let Some(node) = bracket.node_mut(id) {
            node.status = MatchStatus::Bye;
            node.winner = Some(player);
        }
        id
    }
}

/// Current loser round number; moves on only once the round has matches.
#[derive(Debug)]
struct LoserRoundCounter {
    number: u8,
    used: bool,
}

impl Default for LoserRoundCounter {
    fn default() -> Self {
        Self {
            number: 1,
            used: false,
        }
    }
}

impl LoserRoundCounter {
    fn advance_if_used(&mut self) {
        if !self.used {
            return;
        }
        self.used = false;
        if self.number < MAX_LOSER_ROUND {
            self.number += 1;
        } else {
            log::warn!("Loser bracket deeper than {MAX_LOSER_ROUND} rounds, reusing the last round");
        }
    }

    fn round(&self) -> Round {
        Round::loser_round(self.number).unwrap_or(Round::LoserRound12)
    }
}

/// Alternate the two lists, starting with `first`.
fn interleave(first: &[SlotSource], second: &[SlotSource]) -> Vec<SlotSource> {
    let mut merged = Vec::with_capacity(first.len() + second.len());
    for idx in 0..first.len().max(second.len()) {
        merged.extend(first.get(idx).copied());
        merged.extend(second.get(idx).copied());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RoundRules, SeedingMode};

    fn players(n: i64) -> Vec<Player> {
        (1..=n).map(|id| Player::new(id, &format!("P{id}"))).collect()
    }

    fn positional(mode: KnockoutMode) -> GameRules {
        GameRules {
            seeding: SeedingMode::Positional,
            ..GameRules::knockout(mode, 2)
        }
    }

    fn build(rules: &GameRules, qualifiers: &[Player], losers: &[Player]) -> Result<Bracket, ConfigurationError> {
        let mut seeder = Seeder::with_seed(7);
        let mut ids = IdAllocator::new();
        BracketBuilder::new(rules, &mut seeder, &mut ids).build(qualifiers, losers)
    }

    #[test]
    fn test_two_players_play_the_final() {
        let bracket = build(&positional(KnockoutMode::SingleElimination), &players(2), &[]).unwrap();
        assert_eq!(bracket.winner_nodes.len(), 1);
        let final_node = bracket.winner_final().unwrap();
        assert!(final_node.has_both_players());
        assert_eq!(final_node.status, MatchStatus::NotStarted);
    }

    #[test]
    fn test_five_players_single_elimination() {
        let bracket = build(&positional(KnockoutMode::SingleElimination), &players(5), &[]).unwrap();
        assert_eq!(bracket.winner_nodes.len(), 7);
        assert!(bracket.loser_nodes.is_empty());

        let first: Vec<_> = bracket
            .nodes_in_round(BracketType::Winner, Round::Quarterfinal)
            .collect();
        assert_eq!(first.len(), 4);
        assert_eq!(first.iter().filter(|n| n.status == MatchStatus::Bye).count(), 3);
        assert_eq!(first.iter().filter(|n| n.has_both_players()).count(), 1);
        assert_eq!(bracket.nodes_in_round(BracketType::Winner, Round::Semifinal).count(), 2);
        assert_eq!(bracket.nodes_in_round(BracketType::Winner, Round::Final).count(), 1);
    }

    #[test]
    fn test_bye_winners_move_up_at_build_time() {
        let bracket = build(&positional(KnockoutMode::SingleElimination), &players(3), &[]).unwrap();
        // P1 v P2 plays, P3 has the bye and already waits in the final.
        let final_node = bracket.winner_final().unwrap();
        assert_eq!(final_node.slot2.player.as_ref().map(|p| p.id), Some(3));
        assert!(final_node.slot1.player.is_none());
    }

    #[test]
    fn test_too_few_qualifiers() {
        let err = build(&positional(KnockoutMode::SingleElimination), &players(1), &[]).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InsufficientQualifiers {
                needed: 2,
                current: 1
            }
        );
    }

    #[test]
    fn test_double_elimination_four_players() {
        let bracket = build(&positional(KnockoutMode::DoubleElimination), &players(4), &[]).unwrap();
        assert_eq!(bracket.nodes().filter(|n| n.bracket_type == BracketType::Winner && n.round != Round::GrandFinal).count(), 3);
        assert_eq!(bracket.loser_nodes.len(), 1);

        let loser_final = bracket.loser_final().unwrap();
        let semis: Vec<NodeId> = bracket
            .nodes_in_round(BracketType::Winner, Round::Semifinal)
            .map(|n| n.id)
            .collect();
        let sources: Vec<_> = loser_final.sources().collect();
        assert_eq!(sources, vec![SlotSource::loser_of(semis[0]), SlotSource::loser_of(semis[1])]);

        let grand_final = bracket.grand_final().unwrap();
        assert_eq!(grand_final.slot1.source, Some(SlotSource::winner_of(bracket.winner_final().unwrap().id)));
        assert_eq!(grand_final.slot2.source, Some(SlotSource::winner_of(loser_final.id)));
    }

    #[test]
    fn test_group_losers_seed_first_loser_round() {
        let mut rules = positional(KnockoutMode::DoubleElimination);
        rules.include_group_phase_losers_bracket = true;
        let losers: Vec<Player> = (10..13).map(|id| Player::new(id, &format!("L{id}"))).collect();

        let bracket = build(&rules, &players(4), &losers).unwrap();
        let first: Vec<_> = bracket
            .nodes_in_round(BracketType::Loser, Round::LoserRound1)
            .collect();
        assert_eq!(first.len(), 2);
        assert!(first[0].has_both_players());
        assert_eq!(first[1].status, MatchStatus::Bye);
        assert_eq!(first[1].winner.as_ref().map(|p| p.id), Some(12));
        assert!(bracket.loser_final().is_some());
        assert!(bracket.grand_final().is_some());
    }

    #[test]
    fn test_group_losers_ignored_when_disabled() {
        let losers = vec![Player::new(10, "L10"), Player::new(11, "L11")];
        let bracket = build(&positional(KnockoutMode::DoubleElimination), &players(4), &losers).unwrap();
        assert!(bracket.loser_nodes.iter().all(|n| !n.players().any(|p| p.id >= 10)));
    }

    #[test]
    fn test_ids_follow_creation_order() {
        let bracket = build(&positional(KnockoutMode::DoubleElimination), &players(11), &[]).unwrap();
        for node in bracket.nodes() {
            for source in node.sources() {
                assert!(source.node < node.id, "node {} reads from later node {}", node.id, source.node);
            }
        }
    }

    #[test]
    fn test_round_rules_decide_sets() {
        let final_rules = RoundRules {
            play_with_sets: true,
            ..RoundRules::default()
        };
        let rules = positional(KnockoutMode::SingleElimination).with_round_rules(Round::Final, final_rules);
        let bracket = build(&rules, &players(4), &[]).unwrap();
        assert!(bracket.winner_final().unwrap().uses_sets);
        assert!(bracket.nodes_in_round(BracketType::Winner, Round::Semifinal).all(|n| !n.uses_sets));
    }

    #[test]
    fn test_interleave() {
        let a = [SlotSource::winner_of(1)];
        let b = [SlotSource::loser_of(2), SlotSource::loser_of(3)];
        assert_eq!(
            interleave(&a, &b),
            vec![SlotSource::winner_of(1), SlotSource::loser_of(2), SlotSource::loser_of(3)]
        );
    }
}
