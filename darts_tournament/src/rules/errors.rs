//! Configuration error types.

use thiserror::Error;

use crate::tournament::PhaseType;

/// Errors that make a requested phase or bracket impossible to build.
///
/// Raised before anything is mutated, so the tournament is unchanged when
/// one of these comes back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Not enough players to build the next phase
    #[error("Insufficient qualifiers: need {needed}, have {current}")]
    InsufficientQualifiers { needed: usize, current: usize },

    /// A phase the next phase reads its qualifiers from is gone
    #[error("Required source phase missing: {0}")]
    MissingSourcePhase(PhaseType),

    /// Nothing follows the current phase
    #[error("No phase follows {0} under the current configuration")]
    NoNextPhase(PhaseType),

    /// Rules failed validation
    #[error("Invalid rules: {0}")]
    InvalidRules(String),
}
