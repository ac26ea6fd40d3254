//! Bracket error types.

use thiserror::Error;

use super::models::NodeId;
use crate::entities::PlayerId;

/// Rejected bracket mutations. The bracket is unchanged when one comes back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    /// No node with this id
    #[error("Bracket node {0} not found")]
    NodeNotFound(NodeId),

    /// Node already has a played result
    #[error("Bracket node {0} is already finished")]
    AlreadyFinished(NodeId),

    /// Both players are present, so the bye needs an explicit winner
    #[error("Bracket node {0} has two players, a winner must be chosen")]
    WinnerRequired(NodeId),

    /// Chosen winner does not play in this node
    #[error("Player {player} does not play in bracket node {node}")]
    WinnerNotInMatch { node: NodeId, player: PlayerId },

    /// Undo requested on a node that is not a bye
    #[error("Bracket node {0} is not a bye")]
    NotABye(NodeId),

    /// A later node already used this node's outcome
    #[error("Bracket node {dependent} already progressed with the outcome of node {node}")]
    DependentsProgressed { node: NodeId, dependent: NodeId },

    /// Result entry before both players are known
    #[error("Bracket node {0} is still waiting for its players")]
    PlayersMissing(NodeId),

    /// Score rejected by the round rules
    #[error("Invalid result: {0}")]
    InvalidResult(String),
}
