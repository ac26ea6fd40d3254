//! Tournament classes and their phases.
//!
//! This module provides:
//! - The [`TournamentClass`] aggregate: players, rules, phases and ids
//! - Phase transitions Group -> [Round-robin finals] -> [Knockout]
//! - Result entry and bye handling for the current phase
//! - JSON persistence with load-time repair
//!
//! ## Example
//!
//! ```
//! use darts_tournament::entities::Score;
//! use darts_tournament::rules::{GameRules, KnockoutMode};
//! use darts_tournament::tournament::{PhaseType, TournamentClass};
//!
//! let rules = GameRules::knockout(KnockoutMode::SingleElimination, 2);
//! let mut class = TournamentClass::new("Open Singles", rules)?.with_seed(1);
//! for name in ["Anna", "Ben", "Cara", "Dan", "Eve", "Finn"] {
//!     class.register_player(name)?;
//! }
//! class.create_groups(2)?;
//!
//! let ids: Vec<u64> = class.current_phase().unwrap().groups()
//!     .iter()
//!     .flat_map(|g| g.matches.iter().filter(|m| !m.is_bye()).map(|m| m.id))
//!     .collect();
//! for id in ids {
//!     class.enter_result(id, Score::legs(3, 1))?;
//! }
//!
//! assert!(class.can_advance());
//! assert_eq!(class.advance()?, PhaseType::KnockoutPhase);
//! # Ok::<(), darts_tournament::tournament::TournamentError>(())
//! ```

pub mod class;
pub mod errors;
pub mod models;
pub mod repair;
pub mod state_machine;

pub use class::TournamentClass;
pub use errors::{TournamentError, TournamentResult};
pub use models::{
    FinalsStage, GroupStage, KnockoutStage, PhaseProgress, PhaseStage, PhaseStatus, PhaseType,
    TournamentPhase,
};
pub use repair::RepairReport;
pub use state_machine::FINALS_GROUP_NAME;
