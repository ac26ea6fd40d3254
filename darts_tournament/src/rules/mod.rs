//! Match rules supplied by the configuration collaborator.
//!
//! The engine only ever reads these. Group-phase rules double as the
//! fallback for the finals and for any knockout round without an override.

pub mod errors;
pub mod models;

pub use errors::ConfigurationError;
pub use models::{
    FinishMode, GameMode, GameRules, KnockoutMode, PostGroupPhaseMode, RoundRules, SeedingMode,
};
