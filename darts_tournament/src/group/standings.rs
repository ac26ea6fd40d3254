//! Round-robin table.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::entities::{MatchStatus, Player};

use super::models::Group;

/// Points for a win
pub const POINTS_PER_WIN: u32 = 3;
/// Points for a draw
pub const POINTS_PER_DRAW: u32 = 1;

/// One row of a group table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub player: Player,
    /// 1-based rank after sorting
    pub position: usize,
    /// Played matches, byes excluded
    pub played: u32,
    /// Wins, byes included
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub legs_won: u32,
    pub legs_lost: u32,
}

impl Standing {
    fn new(player: Player) -> Self {
        Self {
            player,
            position: 0,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            points: 0,
            sets_won: 0,
            sets_lost: 0,
            legs_won: 0,
            legs_lost: 0,
        }
    }

    pub fn set_difference(&self) -> i64 {
        i64::from(self.sets_won) - i64::from(self.sets_lost)
    }

    pub fn leg_difference(&self) -> i64 {
        i64::from(self.legs_won) - i64::from(self.legs_lost)
    }

    /// Table order: points, set difference, leg difference (all
    /// descending), then name ascending.
    fn table_order(&self, other: &Self) -> Ordering {
        other
            .points
            .cmp(&self.points)
            .then_with(|| other.set_difference().cmp(&self.set_difference()))
            .then_with(|| other.leg_difference().cmp(&self.leg_difference()))
            .then_with(|| self.player.name.cmp(&other.player.name))
    }
}

/// Compute the table of `group` from its Finished and Bye matches.
///
/// Pure: the same match state always yields the same rows and positions.
pub fn calculate_standings(group: &Group) -> Vec<Standing> {
    let mut table: Vec<Standing> = group.players.iter().cloned().map(Standing::new).collect();

    for row in &mut table {
        let id = row.player.id;
        for m in group.matches.iter().filter(|m| m.involves(id)) {
            match m.status {
                MatchStatus::Bye => {
                    if m.winner == Some(id) {
                        row.wins += 1;
                    }
                }
                MatchStatus::Finished => {
                    let first = m.player1.as_ref().is_some_and(|p| p.id == id);
                    let s = &m.score;
                    let (sets_for, sets_against, legs_for, legs_against) = if first {
                        (s.sets1, s.sets2, s.legs1, s.legs2)
                    } else {
                        (s.sets2, s.sets1, s.legs2, s.legs1)
                    };

                    row.played += 1;
                    row.sets_won += sets_for;
                    row.sets_lost += sets_against;
                    row.legs_won += legs_for;
                    row.legs_lost += legs_against;

                    match m.winner {
                        Some(winner) if winner == id => row.wins += 1,
                        Some(_) => row.losses += 1,
                        None => row.draws += 1,
                    }
                }
                MatchStatus::NotStarted | MatchStatus::InProgress => {}
            }
        }
        row.points = row.wins * POINTS_PER_WIN + row.draws * POINTS_PER_DRAW;
    }

    table.sort_by(Standing::table_order);
    for (idx, row) in table.iter_mut().enumerate() {
        row.position = idx + 1;
    }
    table
}

/// Players ranked inside the top `count`.
pub fn qualifiers(standings: &[Standing], count: usize) -> Vec<Player> {
    standings
        .iter()
        .take(count)
        .map(|s| s.player.clone())
        .collect()
}

/// Players ranked below the top `count`, best first.
pub fn non_qualifiers(standings: &[Standing], count: usize) -> Vec<Player> {
    standings
        .iter()
        .skip(count)
        .map(|s| s.player.clone())
        .collect()
}
