//! Plays a whole tournament class with random scores.

use anyhow::{Context, Error};
use darts_tournament::{
    PhaseType, Score, TournamentClass,
    bracket::NodeId,
    entities::MatchId,
    rules::RoundRules,
};
use log::{debug, info};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::RunnerConfig;

/// Chance of a drawn group match when the rules leave room for one.
const DRAW_PERCENT: u32 = 10;

/// Drives a class through all of its phases.
pub struct Simulation {
    rng: StdRng,
}

impl Simulation {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { rng }
    }

    /// Register the field, draw the groups and play every phase.
    pub fn run(&mut self, config: &RunnerConfig) -> Result<TournamentClass, Error> {
        let mut class = TournamentClass::new("Simulated Class", config.rules.clone())?;
        if let Some(seed) = config.seed {
            class = class.with_seed(seed);
        }

        for idx in 1..=config.players {
            class.register_player(&format!("Player {idx:02}"))?;
        }
        let groups = class.create_groups(config.groups)?;
        info!(
            "Registered {} players in {groups} group(s)",
            config.players
        );

        loop {
            let played = self.play_current_phase(&mut class)?;
            info!("{}: {played} match(es) played", class.current_phase_type());

            if !class.can_advance() {
                break;
            }
            let next = class.advance()?;
            info!("Advanced to {next}");
        }

        Ok(class)
    }

    /// Play every open match of the current phase.
    pub fn play_current_phase(&mut self, class: &mut TournamentClass) -> Result<usize, Error> {
        match class.current_phase_type() {
            PhaseType::GroupPhase => {
                let rules = class.rules.group_rules();
                self.play_groups(class, &rules)
            }
            PhaseType::RoundRobinFinals => {
                let rules = class.rules.finals_rules();
                self.play_groups(class, &rules)
            }
            PhaseType::KnockoutPhase => self.play_bracket(class),
        }
    }

    fn play_groups(
        &mut self,
        class: &mut TournamentClass,
        rules: &RoundRules,
    ) -> Result<usize, Error> {
        let open: Vec<(MatchId, bool)> = class
            .current_phase()
            .map(|phase| {
                phase
                    .groups()
                    .iter()
                    .flat_map(|group| group.matches.iter())
                    .filter(|m| !m.is_terminal())
                    .map(|m| (m.id, m.uses_sets))
                    .collect()
            })
            .unwrap_or_default();

        for (id, uses_sets) in &open {
            let score = self.random_score(rules, *uses_sets, true);
            debug!("Match {id}: {score}");
            class
                .enter_result(*id, score)
                .with_context(|| format!("Failed to enter {score} for match {id}"))?;
        }

        Ok(open.len())
    }

    fn play_bracket(&mut self, class: &mut TournamentClass) -> Result<usize, Error> {
        let mut played = 0;

        loop {
            let next: Option<(NodeId, RoundRules, bool)> = class
                .bracket()
                .and_then(|bracket| bracket.playable_nodes().next())
                .map(|node| (node.id, class.rules.round_rules(node.round), node.uses_sets));
            let Some((id, rules, uses_sets)) = next else {
                return Ok(played);
            };

            let score = self.random_score(&rules, uses_sets, false);
            debug!("Node {id}: {score}");
            class
                .enter_result(id, score)
                .with_context(|| format!("Failed to enter {score} for bracket node {id}"))?;
            played += 1;
        }
    }

    /// A finished score under `rules`; a draw only when `allow_draw` is set.
    pub fn random_score(&mut self, rules: &RoundRules, uses_sets: bool, allow_draw: bool) -> Score {
        let target = rules.target(uses_sets);

        let (first, second) = if allow_draw
            && target >= 2
            && self.rng.random_range(0..100) < DRAW_PERCENT
        {
            let level = self.rng.random_range(1..target);
            (level, level)
        } else {
            let beaten = self.rng.random_range(0..target);
            if self.rng.random_bool(0.5) {
                (target, beaten)
            } else {
                (beaten, target)
            }
        };

        if uses_sets {
            let legs = rules.legs_to_win;
            let mut legs1 = first * legs;
            let mut legs2 = second * legs;
            // Lost sets still carry some legs.
            legs1 += self.rng.random_range(0..legs) * second;
            legs2 += self.rng.random_range(0..legs) * first;
            Score::sets(first, second, legs1, legs2)
        } else {
            Score::legs(first, second)
        }
    }
}
