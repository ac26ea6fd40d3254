//! Group phase: round-robin groups, match generation and standings.
//!
//! This module provides:
//! - Group and match models
//! - All-play-all match generation (with the odd-count bye rule)
//! - Standings: points, set/leg differentials and deterministic ranking
//!
//! ## Example
//!
//! ```
//! use darts_tournament::entities::{IdAllocator, Player};
//! use darts_tournament::group::{Group, calculate_standings};
//!
//! let mut ids = IdAllocator::new();
//! let mut group = Group::new(1, "Group A").with_players(vec![
//!     Player::new(1, "Anna"),
//!     Player::new(2, "Ben"),
//!     Player::new(3, "Cara"),
//!     Player::new(4, "Dan"),
//! ]);
//!
//! assert_eq!(group.generate_matches(&mut ids, false), 6);
//! let table = calculate_standings(&group);
//! assert_eq!(table.len(), 4);
//! ```

pub mod models;
pub mod round_robin;
pub mod standings;

pub use models::{Group, GroupId, Match};
pub use round_robin::generate_round_robin;
pub use standings::{Standing, calculate_standings, non_qualifiers, qualifiers};
