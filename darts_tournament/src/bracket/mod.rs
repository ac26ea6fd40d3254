//! Knockout brackets.
//!
//! This module provides:
//! - The bracket graph: nodes whose slots hold a player or name the node
//!   that will supply one
//! - Single and double elimination builders for any field size
//! - Outcome propagation with automatic, manual and void byes
//!
//! ## Example
//!
//! ```
//! use darts_tournament::bracket::{BracketBuilder, Round, enter_result};
//! use darts_tournament::entities::{IdAllocator, Player, Score};
//! use darts_tournament::rules::{GameRules, KnockoutMode};
//! use darts_tournament::seeding::Seeder;
//!
//! let rules = GameRules::knockout(KnockoutMode::SingleElimination, 2);
//! let players: Vec<Player> = (1..=5).map(|id| Player::new(id, &format!("P{id}"))).collect();
//!
//! let mut seeder = Seeder::with_seed(42);
//! let mut ids = IdAllocator::new();
//! let mut bracket = BracketBuilder::new(&rules, &mut seeder, &mut ids)
//!     .single_elimination(&players)
//!     .unwrap();
//! assert_eq!(bracket.winner_nodes.len(), 7);
//!
//! let playable = bracket.playable_nodes().next().unwrap().id;
//! enter_result(&mut bracket, playable, Score::legs(3, 1), &rules.round_rules(Round::Quarterfinal)).unwrap();
//! ```

pub mod builder;
pub mod errors;
pub mod models;
pub mod propagation;

pub use builder::{BracketBuilder, MIN_BRACKET_PLAYERS};
pub use errors::BracketError;
pub use models::{
    Bracket, BracketMatchNode, BracketType, MAX_LOSER_ROUND, NodeId, Round, Slot, SlotSource,
};
pub use propagation::{
    MAX_PROPAGATION_PASSES, PropagationOutcome, enter_result, give_bye, stabilize, start_node,
    undo_bye,
};
