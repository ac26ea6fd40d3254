//! # Darts Tournament
//!
//! A tournament engine for darts competitions: round-robin groups, optional
//! round-robin finals and single or double elimination knockout brackets.
//!
//! ## Architecture
//!
//! A [`TournamentClass`] owns its players, rules and an ordered list of
//! phases. Exactly one phase is current:
//!
//! - **GroupPhase**: players drawn into groups, everybody plays everybody
//! - **RoundRobinFinals**: the group qualifiers in a single all-play-all group
//! - **KnockoutPhase**: a bracket built from the qualifiers
//!
//! Phase contents share the [`tournament::PhaseProgress`] trait through
//! `enum_dispatch`. Brackets are id-addressed arenas; after every result or
//! bye the propagation engine moves winners and losers on and resolves the
//! byes that follow from it.
//!
//! ## Core Modules
//!
//! - [`entities`]: players, scores, match status and id allocation
//! - [`rules`]: game rules, per-round overrides and score resolution
//! - [`group`]: round-robin generation and standings
//! - [`bracket`]: bracket graph, builders and propagation
//! - [`tournament`]: the class aggregate, phase transitions and persistence
//!
//! ## Example
//!
//! ```
//! use darts_tournament::{GameRules, TournamentClass};
//!
//! let mut class = TournamentClass::new("Open Singles", GameRules::default()).unwrap();
//! class.register_player("Anna").unwrap();
//! class.register_player("Ben").unwrap();
//! assert_eq!(class.create_groups(1).unwrap(), 1);
//! ```

/// Players, scores, statuses and ids.
pub mod entities;
pub use entities::{IdAllocator, MatchStatus, Player, PlayerId, Score};

/// Game rules and configuration errors.
pub mod rules;
pub use rules::{ConfigurationError, GameRules, KnockoutMode, PostGroupPhaseMode, RoundRules};

/// Qualifier ordering and group draws.
pub mod seeding;
pub use seeding::Seeder;

/// Round-robin groups and standings.
pub mod group;

/// Knockout brackets.
pub mod bracket;
pub use bracket::{Bracket, BracketError, PropagationOutcome};

/// Tournament classes and phases.
pub mod tournament;
pub use tournament::{
    PhaseType, RepairReport, TournamentClass, TournamentError, TournamentResult,
};
