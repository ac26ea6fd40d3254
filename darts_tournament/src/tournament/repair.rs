//! JSON persistence and load-time repair.

use serde::{Deserialize, Serialize};

use super::class::TournamentClass;
use super::errors::TournamentResult;
use super::models::{GroupStage, PhaseStage, PhaseType, TournamentPhase};
use crate::entities::UNASSIGNED_ID;

/// What [`TournamentClass::repair_after_load`] fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    pub created_group_phase: bool,
    /// Matches generated for a finals group that had none
    pub regenerated_finals_matches: usize,
    /// Groups, matches and nodes that had no id
    pub assigned_ids: usize,
    pub clamped_current_phase: bool,
}

impl RepairReport {
    /// Nothing needed fixing.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

impl TournamentClass {
    /// Bring a freshly deserialized class back to a consistent state.
    ///
    /// Running it again on a repaired class changes nothing.
    pub fn repair_after_load(&mut self) -> RepairReport {
        let mut report = RepairReport::default();

        if self.phases.first().map(TournamentPhase::phase_type) != Some(PhaseType::GroupPhase) {
            let mut group_phase = TournamentPhase::new(GroupStage::default());
            if !self.phases.is_empty() {
                group_phase.complete();
                self.current_phase += 1;
            }
            self.phases.insert(0, group_phase);
            report.created_group_phase = true;
        }

        if self.current_phase >= self.phases.len() {
            self.current_phase = self.phases.len() - 1;
            report.clamped_current_phase = true;
        }

        self.observe_ids();
        report.assigned_ids = self.assign_missing_ids();

        let uses_sets = self.rules.finals_rules().play_with_sets;
        for phase in &mut self.phases {
            if let PhaseStage::FinalsStage(stage) = &mut phase.stage {
                if stage.group.players.len() >= 2 && stage.group.matches.is_empty() {
                    report.regenerated_finals_matches += stage.group.generate_matches(&mut self.ids, uses_sets);
                }
            }
        }

        if let Some(last) = self.players.iter().map(|p| p.id).max() {
            self.last_player_id = self.last_player_id.max(last);
        }

        if !report.is_clean() {
            log::info!("Repaired {} after load: {report:?}", self.name);
        }
        report
    }

    /// Serialize the class, phases and results included.
    pub fn to_json(&self) -> TournamentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize and repair a class.
    pub fn from_json(json: &str) -> TournamentResult<(Self, RepairReport)> {
        let mut class: Self = serde_json::from_str(json)?;
        let report = class.repair_after_load();
        Ok((class, report))
    }

    /// Move the allocator past every id in the document.
    fn observe_ids(&mut self) {
        for phase in &self.phases {
            for group in phase.groups() {
                self.ids.observe(group.id);
                for m in &group.matches {
                    self.ids.observe(m.id);
                }
            }
            if let Some(bracket) = phase.bracket() {
                for node in bracket.nodes() {
                    self.ids.observe(node.id);
                }
            }
        }
    }

    fn assign_missing_ids(&mut self) -> usize {
        let mut assigned = 0;
        for phase in &mut self.phases {
            for group in phase.groups_mut() {
                if group.id == UNASSIGNED_ID {
                    group.id = self.ids.allocate();
                    assigned += 1;
                }
                for m in group.matches.iter_mut().filter(|m| m.id == UNASSIGNED_ID) {
                    m.id = self.ids.allocate();
                    assigned += 1;
                }
            }
            if let Some(bracket) = phase.bracket_mut() {
                for node in bracket.nodes_mut().filter(|n| n.id == UNASSIGNED_ID) {
                    node.id = self.ids.allocate();
                    assigned += 1;
                }
            }
        }
        assigned
    }
}
