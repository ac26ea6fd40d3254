//! Shared tournament entities: players, match status, scores and ids.

use serde::{Deserialize, Serialize};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// Player identifier. Stable across save/load.
pub type PlayerId = i64;

/// Identifier for round-robin matches.
pub type MatchId = u64;

/// Id value carried by matches and nodes that were never given one.
pub const UNASSIGNED_ID: u64 = 0;

/// A registered tournament participant.
///
/// Equality and hashing only look at [`Player::id`], so a player read back
/// from a saved document compares equal to the one that was written.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Player {
    pub fn new(id: PlayerId, name: &str) -> Self {
        Self {
            id,
            name: name.trim().to_string(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.trim().to_string());
        self
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Player {}

impl Hash for Player {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

/// Lifecycle of a match or bracket node.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum MatchStatus {
    #[default]
    NotStarted,
    InProgress,
    Finished,
    Bye,
}

impl MatchStatus {
    /// Finished and Bye are the two states a match never leaves on its own.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Bye)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::NotStarted => "not started",
            Self::InProgress => "in progress",
            Self::Finished => "finished",
            Self::Bye => "bye",
        };
        write!(f, "{repr}")
    }
}

/// Sets and legs won by each side, as entered by the scorer.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Score {
    pub sets1: u32,
    pub sets2: u32,
    pub legs1: u32,
    pub legs2: u32,
}

impl Score {
    /// Score for a match played in legs only.
    pub const fn legs(legs1: u32, legs2: u32) -> Self {
        Self {
            sets1: 0,
            sets2: 0,
            legs1,
            legs2,
        }
    }

    /// Score for a match played in sets. `legs1`/`legs2` are the total legs.
    pub const fn sets(sets1: u32, sets2: u32, legs1: u32, legs2: u32) -> Self {
        Self {
            sets1,
            sets2,
            legs1,
            legs2,
        }
    }

    /// The pair of counters that decides the match.
    pub fn deciding(&self, uses_sets: bool) -> (u32, u32) {
        if uses_sets {
            (self.sets1, self.sets2)
        } else {
            (self.legs1, self.legs2)
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sets1 + self.sets2 > 0 {
            write!(
                f,
                "{}:{} ({}:{})",
                self.sets1, self.sets2, self.legs1, self.legs2
            )
        } else {
            write!(f, "{}:{}", self.legs1, self.legs2)
        }
    }
}

/// Result of a score once resolved against the match rules.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Outcome {
    Player1,
    Player2,
    Draw,
}

/// Hands out match and node ids for one tournament class.
///
/// Ids are never reused, so allocation order doubles as creation order.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Make sure `id` is never handed out again.
    pub fn observe(&mut self, id: u64) {
        if id >= self.next {
            self.next = id + 1;
        }
    }

    pub fn peek(&self) -> u64 {
        self.next
    }
}
