//! Phase transitions: Group -> [Finals] -> [Knockout].

use super::class::TournamentClass;
use super::errors::{TournamentError, TournamentResult};
use super::models::{FinalsStage, KnockoutStage, PhaseStage, PhaseType, TournamentPhase};
use crate::bracket::{BracketBuilder, MIN_BRACKET_PLAYERS};
use crate::entities::{IdAllocator, Player};
use crate::group::{Group, calculate_standings};
use crate::rules::{ConfigurationError, PostGroupPhaseMode};

/// Name of the round-robin finals group.
pub const FINALS_GROUP_NAME: &str = "Finals";

/// Qualifiers and the rest of a phase, both position-major: every group's
/// first place in group order, then every second place, and so on.
fn split_by_position(groups: &[Group], qualifying: usize) -> (Vec<Player>, Vec<Player>) {
    let tables: Vec<_> = groups.iter().map(calculate_standings).collect();
    let deepest = tables.iter().map(Vec::len).max().unwrap_or(0);

    let mut qualifiers = Vec::new();
    let mut rest = Vec::new();
    for position in 0..deepest {
        for table in &tables {
            if let Some(row) = table.get(position) {
                if position < qualifying {
                    qualifiers.push(row.player.clone());
                } else {
                    rest.push(row.player.clone());
                }
            }
        }
    }
    (qualifiers, rest)
}

impl TournamentClass {
    /// Phase that would follow the current one under the configured rules.
    pub fn next_phase_type(&self) -> Option<PhaseType> {
        match self.current_phase_type() {
            PhaseType::GroupPhase => match self.rules.post_group_phase_mode {
                PostGroupPhaseMode::None => None,
                PostGroupPhaseMode::RoundRobinFinals => Some(PhaseType::RoundRobinFinals),
                PostGroupPhaseMode::KnockoutBracket => Some(PhaseType::KnockoutPhase),
            },
            PhaseType::RoundRobinFinals if self.rules.finals_followed_by_knockout => {
                Some(PhaseType::KnockoutPhase)
            }
            PhaseType::RoundRobinFinals | PhaseType::KnockoutPhase => None,
        }
    }

    /// A next phase exists and the current phase is complete.
    pub fn can_advance(&self) -> bool {
        self.next_phase_type().is_some() && self.current_phase().is_some_and(|p| p.is_complete())
    }

    /// Build the next phase from the current phase's standings and make it
    /// current.
    ///
    /// The new phase is built before anything changes; on error the class
    /// is untouched.
    pub fn advance(&mut self) -> TournamentResult<PhaseType> {
        let current = self.current_phase_type();
        let next = self
            .next_phase_type()
            .ok_or(ConfigurationError::NoNextPhase(current))?;
        if !self.current_phase().is_some_and(|p| p.is_complete()) {
            return Err(TournamentError::PhaseIncomplete(current));
        }

        let mut ids = self.ids.clone();
        let stage = self.build_stage(next, &mut ids)?;
        self.ids = ids;

        if let Some(phase) = self.phases.get_mut(self.current_phase) {
            phase.complete();
        }
        self.phases.push(TournamentPhase::new(stage));
        self.current_phase = self.phases.len() - 1;

        log::info!("{}: {current} completed, {next} started", self.name);
        Ok(next)
    }

    /// Drop every phase after the group phase and reopen it.
    ///
    /// # Returns
    ///
    /// * `usize` - Number of phases removed
    pub fn reset_to_group_phase(&mut self) -> usize {
        let removed = self.phases.len().saturating_sub(1);
        self.phases.truncate(1);
        self.current_phase = 0;
        if let Some(group_phase) = self.phases.first_mut() {
            group_phase.reactivate();
        }

        if removed > 0 {
            log::info!("{}: reset to group phase, {removed} phases removed", self.name);
        }
        removed
    }

    fn build_stage(&mut self, next: PhaseType, ids: &mut IdAllocator) -> TournamentResult<PhaseStage> {
        let source = self
            .current_phase()
            .ok_or(ConfigurationError::MissingSourcePhase(self.current_phase_type()))?;
        let (qualifiers, _) = split_by_position(source.groups(), self.rules.qualifying_players_per_group);

        if qualifiers.len() < MIN_BRACKET_PLAYERS {
            return Err(ConfigurationError::InsufficientQualifiers {
                needed: MIN_BRACKET_PLAYERS,
                current: qualifiers.len(),
            }
            .into());
        }

        match next {
            PhaseType::RoundRobinFinals => {
                let mut group = Group::new(ids.allocate(), FINALS_GROUP_NAME).with_players(qualifiers);
                group.generate_matches(ids, self.rules.finals_rules().play_with_sets);
                Ok(FinalsStage { group }.into())
            }
            PhaseType::KnockoutPhase => {
                let group_losers = if self.rules.include_group_phase_losers_bracket {
                    let group_phase = self
                        .phase(PhaseType::GroupPhase)
                        .ok_or(ConfigurationError::MissingSourcePhase(PhaseType::GroupPhase))?;
                    split_by_position(group_phase.groups(), self.rules.qualifying_players_per_group).1
                } else {
                    Vec::new()
                };

                let bracket = BracketBuilder::new(&self.rules, &mut self.seeder, ids)
                    .build(&qualifiers, &group_losers)?;
                Ok(KnockoutStage { bracket }.into())
            }
            PhaseType::GroupPhase => Err(ConfigurationError::NoNextPhase(self.current_phase_type()).into()),
        }
    }
}
