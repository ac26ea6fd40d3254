//! Tournament error types.

use thiserror::Error;

use super::models::PhaseType;
use crate::bracket::BracketError;
use crate::entities::{MatchId, PlayerId};
use crate::group::GroupId;
use crate::rules::ConfigurationError;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Bracket(#[from] BracketError),

    #[error("The {0} is not complete yet")]
    PhaseIncomplete(PhaseType),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Operation not available during the {actual}")]
    WrongPhase { actual: PhaseType },

    #[error("Invalid result: {0}")]
    InvalidResult(String),

    #[error("Player already registered: {0}")]
    DuplicatePlayer(PlayerId),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
