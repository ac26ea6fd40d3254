//! Knockout bracket models.
//!
//! Nodes live in two arenas (winner and loser side) and reference each other
//! by id only. A slot either already holds a player or names the node whose
//! winner/loser will fill it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::{MatchStatus, Player, PlayerId, Score};

/// Bracket node ID type
pub type NodeId = u64;

/// Side of a double-elimination bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BracketType {
    Winner,
    Loser,
}

impl fmt::Display for BracketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketType::Winner => write!(f, "winner bracket"),
            BracketType::Loser => write!(f, "loser bracket"),
        }
    }
}

/// Knockout round, in playing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Round {
    Best64,
    Best32,
    Best16,
    Quarterfinal,
    Semifinal,
    Final,
    GrandFinal,
    LoserRound1,
    LoserRound2,
    LoserRound3,
    LoserRound4,
    LoserRound5,
    LoserRound6,
    LoserRound7,
    LoserRound8,
    LoserRound9,
    LoserRound10,
    LoserRound11,
    LoserRound12,
    LoserFinal,
}

/// Highest numbered loser round.
pub const MAX_LOSER_ROUND: u8 = 12;

const LOSER_ROUNDS: [Round; MAX_LOSER_ROUND as usize] = [
    Round::LoserRound1,
    Round::LoserRound2,
    Round::LoserRound3,
    Round::LoserRound4,
    Round::LoserRound5,
    Round::LoserRound6,
    Round::LoserRound7,
    Round::LoserRound8,
    Round::LoserRound9,
    Round::LoserRound10,
    Round::LoserRound11,
    Round::LoserRound12,
];

impl Round {
    /// Winner-bracket round for a field of `players` slots.
    pub fn for_field_size(players: usize) -> Self {
        match players {
            0..=2 => Round::Final,
            3..=4 => Round::Semifinal,
            5..=8 => Round::Quarterfinal,
            9..=16 => Round::Best16,
            17..=32 => Round::Best32,
            _ => Round::Best64,
        }
    }

    /// `LoserRound{number}` for 1..=12.
    pub fn loser_round(number: u8) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|idx| LOSER_ROUNDS.get(usize::from(idx)))
            .copied()
    }

    pub fn loser_round_number(self) -> Option<u8> {
        LOSER_ROUNDS
            .iter()
            .position(|r| *r == self)
            .map(|idx| idx as u8 + 1)
    }

    pub fn is_loser_round(self) -> bool {
        self == Round::LoserFinal || self.loser_round_number().is_some()
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Round::Best64 => write!(f, "Last 64"),
            Round::Best32 => write!(f, "Last 32"),
            Round::Best16 => write!(f, "Last 16"),
            Round::Quarterfinal => write!(f, "Quarterfinal"),
            Round::Semifinal => write!(f, "Semifinal"),
            Round::Final => write!(f, "Final"),
            Round::GrandFinal => write!(f, "Grand Final"),
            Round::LoserFinal => write!(f, "Loser Final"),
            loser => match loser.loser_round_number() {
                Some(n) => write!(f, "Loser Round {n}"),
                None => write!(f, "{loser:?}"),
            },
        }
    }
}

/// Reference to the node whose outcome fills a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotSource {
    pub node: NodeId,
    /// `true` takes the winner, `false` the loser
    pub take_winner: bool,
}

impl SlotSource {
    pub const fn winner_of(node: NodeId) -> Self {
        Self {
            node,
            take_winner: true,
        }
    }

    pub const fn loser_of(node: NodeId) -> Self {
        Self {
            node,
            take_winner: false,
        }
    }
}

/// One side of a bracket node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub player: Option<Player>,
    pub source: Option<SlotSource>,
}

impl Slot {
    pub fn with_player(player: Player) -> Self {
        Self {
            player: Some(player),
            source: None,
        }
    }

    pub fn from_source(source: SlotSource) -> Self {
        Self {
            player: None,
            source: Some(source),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_filled(&self) -> bool {
        self.player.is_some()
    }
}

/// A knockout match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketMatchNode {
    #[serde(default)]
    pub id: NodeId,
    pub bracket_type: BracketType,
    pub round: Round,
    /// Order among the nodes of the same round
    pub position: usize,
    pub slot1: Slot,
    pub slot2: Slot,
    #[serde(default)]
    pub score: Option<Score>,
    pub winner: Option<Player>,
    pub loser: Option<Player>,
    pub status: MatchStatus,
    pub uses_sets: bool,
    /// Bye granted by hand rather than detected
    #[serde(default)]
    pub manual_bye: bool,
}

impl BracketMatchNode {
    pub fn new(
        id: NodeId,
        bracket_type: BracketType,
        round: Round,
        position: usize,
        slot1: Slot,
        slot2: Slot,
        uses_sets: bool,
    ) -> Self {
        Self {
            id,
            bracket_type,
            round,
            position,
            slot1,
            slot2,
            score: None,
            winner: None,
            loser: None,
            status: MatchStatus::NotStarted,
            uses_sets,
            manual_bye: false,
        }
    }

    pub fn slots(&self) -> [&Slot; 2] {
        [&self.slot1, &self.slot2]
    }

    pub fn slots_mut(&mut self) -> [&mut Slot; 2] {
        [&mut self.slot1, &mut self.slot2]
    }

    pub fn sources(&self) -> impl Iterator<Item = SlotSource> + '_ {
        self.slots().into_iter().filter_map(|slot| slot.source)
    }

    pub fn depends_on(&self, node: NodeId) -> bool {
        self.sources().any(|source| source.node == node)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.slots()
            .into_iter()
            .filter_map(|slot| slot.player.as_ref())
    }

    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.players().any(|p| p.id == player_id)
    }

    pub fn has_both_players(&self) -> bool {
        self.slot1.is_filled() && self.slot2.is_filled()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Finished, or a bye that already produced its winner.
    pub fn has_progressed(&self) -> bool {
        match self.status {
            MatchStatus::Finished => true,
            MatchStatus::Bye => self.winner.is_some(),
            MatchStatus::NotStarted | MatchStatus::InProgress => false,
        }
    }

    /// A bye that has no player and never will.
    pub fn is_void(&self) -> bool {
        self.status == MatchStatus::Bye && self.winner.is_none() && !self.manual_bye
    }

    /// The stored loser, or the non-winning player when both played.
    pub fn effective_loser(&self) -> Option<&Player> {
        if self.loser.is_some() {
            return self.loser.as_ref();
        }
        let winner = self.winner.as_ref()?;
        if !self.has_both_players() {
            return None;
        }
        self.players().find(|p| p.id != winner.id)
    }

    /// Forget the outcome and go back to NotStarted. Slots are kept.
    pub fn reset(&mut self) {
        self.status = MatchStatus::NotStarted;
        self.score = None;
        self.winner = None;
        self.loser = None;
        self.manual_bye = false;
    }
}

/// The knockout graph of one tournament phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub winner_nodes: Vec<BracketMatchNode>,
    #[serde(default)]
    pub loser_nodes: Vec<BracketMatchNode>,
}

impl Bracket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &BracketMatchNode> {
        self.winner_nodes.iter().chain(self.loser_nodes.iter())
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut BracketMatchNode> {
        self.winner_nodes
            .iter_mut()
            .chain(self.loser_nodes.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.winner_nodes.len() + self.loser_nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winner_nodes.is_empty() && self.loser_nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&BracketMatchNode> {
        self.nodes().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut BracketMatchNode> {
        self.nodes_mut().find(|n| n.id == id)
    }

    /// All node ids, ascending. Sources are always created before the
    /// nodes that reference them, so this is a topological order.
    pub fn node_ids_in_order(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes().map(|n| n.id).collect();
        ids.sort_unstable();
        ids
    }

    /// Nodes fed by `id`.
    pub fn dependents(&self, id: NodeId) -> impl Iterator<Item = &BracketMatchNode> {
        self.nodes().filter(move |n| n.depends_on(id))
    }

    pub fn nodes_in_round(
        &self,
        bracket_type: BracketType,
        round: Round,
    ) -> impl Iterator<Item = &BracketMatchNode> {
        self.nodes()
            .filter(move |n| n.bracket_type == bracket_type && n.round == round)
    }

    /// Distinct rounds of one side, in playing order.
    pub fn rounds(&self, bracket_type: BracketType) -> Vec<Round> {
        let mut rounds: Vec<Round> = self
            .nodes()
            .filter(|n| n.bracket_type == bracket_type)
            .map(|n| n.round)
            .collect();
        rounds.sort_unstable();
        rounds.dedup();
        rounds
    }

    pub fn winner_final(&self) -> Option<&BracketMatchNode> {
        self.nodes_in_round(BracketType::Winner, Round::Final).next()
    }

    pub fn loser_final(&self) -> Option<&BracketMatchNode> {
        self.nodes_in_round(BracketType::Loser, Round::LoserFinal).next()
    }

    pub fn grand_final(&self) -> Option<&BracketMatchNode> {
        self.nodes().find(|n| n.round == Round::GrandFinal)
    }

    /// Every node is Finished or Bye.
    pub fn is_complete(&self) -> bool {
        !self.is_empty() && self.nodes().all(BracketMatchNode::is_terminal)
    }

    pub fn pending_nodes(&self) -> usize {
        self.nodes().filter(|n| !n.is_terminal()).count()
    }

    /// Nodes ready to be played: both players known, no result yet.
    pub fn playable_nodes(&self) -> impl Iterator<Item = &BracketMatchNode> {
        self.nodes()
            .filter(|n| !n.is_terminal() && n.has_both_players())
    }

    /// Winner of the deciding match once it is decided.
    pub fn champion(&self) -> Option<&Player> {
        match self.grand_final() {
            Some(grand_final) => grand_final.winner.as_ref(),
            None => self.winner_final().and_then(|f| f.winner.as_ref()),
        }
    }
}
