//! Qualifier ordering and group draws.

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::entities::Player;
use crate::rules::SeedingMode;

/// Orders players for bracket pairing and deals them into groups.
#[derive(Clone, Debug)]
pub struct Seeder {
    /// Random number generator
    rng: StdRng,
}

impl Seeder {
    /// Create a seeder drawing entropy from the thread RNG
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Create a reproducible seeder
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Order players for pairing.
    ///
    /// Random seeding is a uniform shuffle; positional seeding keeps the
    /// given order.
    pub fn order(&mut self, players: &[Player], mode: SeedingMode) -> Vec<Player> {
        let mut ordered = players.to_vec();
        if mode == SeedingMode::Random {
            ordered.shuffle(&mut self.rng);
        }
        ordered
    }

    /// Deal players into `group_count` groups, one to each group in turn.
    ///
    /// # Returns
    ///
    /// * `Vec<Vec<Player>>` - One entry per group; sizes differ by at most one
    pub fn draw_groups(
        &mut self,
        players: &[Player],
        group_count: usize,
        mode: SeedingMode,
    ) -> Vec<Vec<Player>> {
        if group_count == 0 {
            return Vec::new();
        }

        let mut groups = vec![Vec::new(); group_count];
        for (idx, player) in self.order(players, mode).into_iter().enumerate() {
            groups[idx % group_count].push(player);
        }
        groups
    }
}

impl Default for Seeder {
    fn default() -> Self {
        Self::new()
    }
}
