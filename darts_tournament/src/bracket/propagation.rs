//! Winner/loser propagation and bye handling.
//!
//! Every mutation ends with [`stabilize`], which pushes decided outcomes into
//! the slots that reference them and turns nodes that can no longer get a
//! second player into byes, until nothing changes.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::entities::{MatchStatus, Outcome, Player, PlayerId, Score};
use crate::rules::RoundRules;

use super::errors::BracketError;
use super::models::{Bracket, BracketMatchNode, BracketType, NodeId, Slot, SlotSource};

/// Upper bound on fixed-point passes.
pub const MAX_PROPAGATION_PASSES: usize = 15;

/// What a [`stabilize`] run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationOutcome {
    pub passes: usize,
    pub changes: usize,
    /// `false` when the pass ceiling was hit with changes still pending
    pub converged: bool,
}

/// Propagate outcomes and resolve automatic byes until a pass changes
/// nothing. Running it twice in a row is a no-op the second time.
pub fn stabilize(bracket: &mut Bracket) -> PropagationOutcome {
    let order = bracket.node_ids_in_order();
    let mut outcome = PropagationOutcome::default();

    for pass in 1..=MAX_PROPAGATION_PASSES {
        outcome.passes = pass;
        let mut changed = 0;
        for &id in &order {
            changed += resolve_automatic_bye(bracket, id);
            changed += propagate_from(bracket, id);
        }
        log::debug!("Propagation pass {pass}: {changed} changes");

        outcome.changes += changed;
        if changed == 0 {
            outcome.converged = true;
            return outcome;
        }
    }

    log::warn!(
        "Bracket propagation stopped after {MAX_PROPAGATION_PASSES} passes without converging"
    );
    outcome
}

/// Copy the winner (and, for the winner bracket, the loser) of `id` into
/// every open slot that references it.
fn propagate_from(bracket: &mut Bracket, id: NodeId) -> usize {
    let Some(node) = bracket.node(id) else {
        return 0;
    };
    if !node.has_progressed() {
        return 0;
    }
    let winner = node.winner.clone();
    let loser = match node.bracket_type {
        BracketType::Winner => node.effective_loser().cloned(),
        BracketType::Loser => None,
    };

    let mut changes = 0;
    for dependent in bracket.nodes_mut() {
        if dependent.has_progressed() {
            continue;
        }
        let dependent_type = dependent.bracket_type;
        for slot in dependent.slots_mut() {
            let incoming = match slot.source {
                Some(source) if source.node == id && source.take_winner => winner.clone(),
                Some(source) if source.node == id && dependent_type == BracketType::Loser => {
                    loser.clone()
                }
                _ => continue,
            };
            if incoming.is_some() && slot.player != incoming {
                slot.player = incoming;
                changes += 1;
            }
        }
    }
    changes
}

/// Turn `id` into a bye when it can never be played.
fn resolve_automatic_bye(bracket: &mut Bracket, id: NodeId) -> usize {
    let Some(node) = bracket.node(id) else {
        return 0;
    };

    let status = node.status;
    match status {
        MatchStatus::NotStarted => {
            let alive = {
                let mut liveness = Liveness::new(bracket);
                [liveness.slot(&node.slot1, 0), liveness.slot(&node.slot2, 0)]
            };
            let winner = match (&node.slot1.player, &node.slot2.player) {
                (Some(player), None) if !alive[1] => Some(player.clone()),
                (None, Some(player)) if !alive[0] => Some(player.clone()),
                (None, None) if !alive[0] && !alive[1] => None,
                _ => return 0,
            };

            if let Some(node) = bracket.node_mut(id) {
                match &winner {
                    Some(player) => log::debug!("Node {id}: automatic bye for {player}"),
                    None => log::debug!("Node {id}: no players can arrive, void bye"),
                }
                node.status = MatchStatus::Bye;
                node.winner = winner;
                node.loser = None;
            }
            1
        }
        MatchStatus::Bye if node.winner.is_none() => {
            let winner = node.slot1.player.clone().or_else(|| node.slot2.player.clone());
            let Some(winner) = winner else {
                return 0;
            };
            let loser = node.players().find(|p| p.id != winner.id).cloned();
            if let Some(node) = bracket.node_mut(id) {
                log::debug!("Node {id}: pending bye goes to {winner}");
                node.winner = Some(winner);
                node.loser = loser;
            }
            1
        }
        _ => 0,
    }
}

/// Memoized "can this slot ever hold a player" check.
struct Liveness<'a> {
    bracket: &'a Bracket,
    memo: HashMap<SlotSource, bool>,
}

impl<'a> Liveness<'a> {
    fn new(bracket: &'a Bracket) -> Self {
        Self {
            bracket,
            memo: HashMap::new(),
        }
    }

    fn slot(&mut self, slot: &Slot, depth: usize) -> bool {
        if slot.player.is_some() {
            return true;
        }
        match slot.source {
            Some(source) => self.source(source, depth + 1),
            None => false,
        }
    }

    fn source(&mut self, source: SlotSource, depth: usize) -> bool {
        if let Some(&known) = self.memo.get(&source) {
            return known;
        }
        // Sources always point at older nodes; a deeper chain means a cycle.
        if depth > self.bracket.len() {
            return false;
        }
        let bracket = self.bracket;
        let Some(node) = bracket.node(source.node) else {
            return false;
        };

        let alive = match node.status {
            MatchStatus::Finished | MatchStatus::Bye if node.winner.is_some() => {
                if source.take_winner {
                    true
                } else {
                    node.bracket_type == BracketType::Winner && node.effective_loser().is_some()
                }
            }
            MatchStatus::Bye => {
                source.take_winner && (self.slot(&node.slot1, depth) || self.slot(&node.slot2, depth))
            }
            MatchStatus::Finished => false,
            MatchStatus::NotStarted | MatchStatus::InProgress => {
                if source.take_winner {
                    self.slot(&node.slot1, depth) || self.slot(&node.slot2, depth)
                } else {
                    node.bracket_type == BracketType::Winner
                        && self.slot(&node.slot1, depth)
                        && self.slot(&node.slot2, depth)
                }
            }
        };

        self.memo.insert(source, alive);
        alive
    }
}

/// Nodes whose slots would change if `id` changed its outcome.
///
/// Void byes and automatic byes that only carry a player handed on from
/// upstream pass the change through, so their dependents are walked too.
struct Affected {
    nodes: Vec<NodeId>,
    pass_through: HashSet<NodeId>,
}

fn affected_nodes(bracket: &Bracket, id: NodeId) -> Affected {
    let mut affected = Affected {
        nodes: Vec::new(),
        pass_through: HashSet::new(),
    };
    let mut seen = HashSet::new();
    let mut stack = vec![id];

    while let Some(current) = stack.pop() {
        for dependent in bracket.dependents(current) {
            if seen.insert(dependent.id) {
                affected.nodes.push(dependent.id);
            }
            let passes = dependent.is_void() || is_inherited_bye(dependent, current);
            if passes && affected.pass_through.insert(dependent.id) {
                stack.push(dependent.id);
            }
        }
    }
    affected
}

/// An automatic bye won by the player that `from` handed on.
fn is_inherited_bye(node: &BracketMatchNode, from: NodeId) -> bool {
    if node.status != MatchStatus::Bye || node.manual_bye {
        return false;
    }
    let Some(winner) = node.winner.as_ref() else {
        return false;
    };
    node.slots().into_iter().any(|slot| {
        slot.player.as_ref() == Some(winner) && slot.source.is_some_and(|s| s.node == from)
    })
}

fn ensure_dependents_open(bracket: &Bracket, id: NodeId) -> Result<(), BracketError> {
    let affected = affected_nodes(bracket, id);
    for dependent in affected.nodes {
        if affected.pass_through.contains(&dependent) {
            continue;
        }
        let progressed = bracket.node(dependent).is_some_and(|n| n.has_progressed());
        if progressed {
            return Err(BracketError::DependentsProgressed {
                node: id,
                dependent,
            });
        }
    }
    Ok(())
}

/// Take back everything `id` handed on: clear inherited slots and reopen
/// the byes that only existed because of it.
fn withdraw_outcome(bracket: &mut Bracket, id: NodeId) {
    let Affected {
        nodes,
        pass_through,
    } = affected_nodes(bracket, id);

    for node_id in nodes {
        let Some(node) = bracket.node_mut(node_id) else {
            continue;
        };
        for slot in node.slots_mut() {
            if slot
                .source
                .is_some_and(|s| s.node == id || pass_through.contains(&s.node))
            {
                slot.player = None;
            }
        }
        if pass_through.contains(&node_id) {
            node.reset();
        }
    }
}

/// Award node `id` by hand.
///
/// With two players present `winner` is required and must be one of them.
/// With one player the winner defaults to that player. A node without
/// players takes a winner-less bye that resolves when the first player
/// arrives. Giving a bye again with another winner is allowed while no
/// later node has used the first one.
pub fn give_bye(
    bracket: &mut Bracket,
    id: NodeId,
    winner: Option<PlayerId>,
) -> Result<PropagationOutcome, BracketError> {
    let node = bracket.node(id).ok_or(BracketError::NodeNotFound(id))?;
    if node.status == MatchStatus::Finished {
        return Err(BracketError::AlreadyFinished(id));
    }

    let players: Vec<Player> = node.players().cloned().collect();
    let chosen = match winner {
        Some(player) => Some(
            players
                .iter()
                .find(|p| p.id == player)
                .cloned()
                .ok_or(BracketError::WinnerNotInMatch { node: id, player })?,
        ),
        None => match players.as_slice() {
            [] => None,
            [only] => Some(only.clone()),
            _ => return Err(BracketError::WinnerRequired(id)),
        },
    };
    let loser = chosen
        .as_ref()
        .and_then(|w| players.iter().find(|p| p.id != w.id).cloned());

    if node.has_progressed() {
        ensure_dependents_open(bracket, id)?;
        withdraw_outcome(bracket, id);
    }

    if let Some(node) = bracket.node_mut(id) {
        node.status = MatchStatus::Bye;
        node.score = None;
        node.winner = chosen;
        node.loser = loser;
        node.manual_bye = true;
    }
    log::info!("Manual bye on bracket node {id}");

    Ok(stabilize(bracket))
}

/// Revert a bye on node `id` and re-run automatic detection.
pub fn undo_bye(bracket: &mut Bracket, id: NodeId) -> Result<PropagationOutcome, BracketError> {
    let node = bracket.node(id).ok_or(BracketError::NodeNotFound(id))?;
    if node.status != MatchStatus::Bye {
        return Err(BracketError::NotABye(id));
    }
    ensure_dependents_open(bracket, id)?;

    withdraw_outcome(bracket, id);
    if let Some(node) = bracket.node_mut(id) {
        node.reset();
    }
    log::info!("Bye on bracket node {id} undone");

    Ok(stabilize(bracket))
}

/// Record a played result and propagate it.
///
/// Entering a result on a node that already progressed is a correction and
/// follows the same dependents rule as [`undo_bye`].
pub fn enter_result(
    bracket: &mut Bracket,
    id: NodeId,
    score: Score,
    rules: &RoundRules,
) -> Result<PropagationOutcome, BracketError> {
    let node = bracket.node(id).ok_or(BracketError::NodeNotFound(id))?;
    let (Some(first), Some(second)) = (node.slot1.player.clone(), node.slot2.player.clone()) else {
        return Err(BracketError::PlayersMissing(id));
    };

    let (winner, loser) = match rules
        .resolve(&score, node.uses_sets)
        .map_err(BracketError::InvalidResult)?
    {
        Outcome::Player1 => (first, second),
        Outcome::Player2 => (second, first),
        Outcome::Draw => {
            return Err(BracketError::InvalidResult(
                "a knockout match cannot end in a draw".to_string(),
            ));
        }
    };

    if node.has_progressed() {
        ensure_dependents_open(bracket, id)?;
        withdraw_outcome(bracket, id);
    }

    if let Some(node) = bracket.node_mut(id) {
        log::info!("Bracket node {id} ({}): {winner} beats {loser} {score}", node.round);
        node.status = MatchStatus::Finished;
        node.score = Some(score);
        node.winner = Some(winner);
        node.loser = Some(loser);
        node.manual_bye = false;
    }

    Ok(stabilize(bracket))
}

/// Mark node `id` as being played.
pub fn start_node(bracket: &mut Bracket, id: NodeId) -> Result<(), BracketError> {
    let node = bracket.node_mut(id).ok_or(BracketError::NodeNotFound(id))?;
    match node.status {
        MatchStatus::InProgress => Ok(()),
        MatchStatus::Finished | MatchStatus::Bye => Err(BracketError::AlreadyFinished(id)),
        MatchStatus::NotStarted if !node.has_both_players() => Err(BracketError::PlayersMissing(id)),
        MatchStatus::NotStarted => {
            node.status = MatchStatus::InProgress;
            Ok(())
        }
    }
}
