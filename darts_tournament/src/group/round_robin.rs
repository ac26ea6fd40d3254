//! All-play-all match generation.

use crate::entities::{IdAllocator, Player};

use super::models::{Group, Match};

/// Every unordered pair of `players` as a match, in draw order.
///
/// With an odd number of players each player additionally gets one bye
/// match. That grants a bye to every player instead of one sit-out per
/// round; standings count each of those byes as a win.
pub fn generate_round_robin(
    players: &[Player],
    ids: &mut IdAllocator,
    uses_sets: bool,
) -> Vec<Match> {
    let n = players.len();
    let mut matches = Vec::with_capacity(n * n.saturating_sub(1) / 2 + n % 2 * n);

    for (i, first) in players.iter().enumerate() {
        for second in &players[i + 1..] {
            matches.push(Match::new(
                ids.allocate(),
                first.clone(),
                second.clone(),
                uses_sets,
            ));
        }
    }

    if n % 2 == 1 {
        for player in players {
            matches.push(Match::bye(ids.allocate(), player.clone(), uses_sets));
        }
    }

    matches
}

impl Group {
    /// Replace all matches with a fresh round robin of the current players.
    ///
    /// # Returns
    ///
    /// * `usize` - Number of matches generated
    pub fn generate_matches(&mut self, ids: &mut IdAllocator, uses_sets: bool) -> usize {
        self.matches.clear();
        self.matches = generate_round_robin(&self.players, ids, uses_sets);
        log::debug!(
            "Generated {} matches for {} ({} players)",
            self.matches.len(),
            self.name,
            self.players.len()
        );
        self.matches.len()
    }
}
