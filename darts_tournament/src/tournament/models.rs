//! Tournament phase models.

use chrono::{DateTime, Utc};
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bracket::Bracket;
use crate::group::Group;

/// Stage of a tournament class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseType {
    GroupPhase,
    RoundRobinFinals,
    KnockoutPhase,
}

impl fmt::Display for PhaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::GroupPhase => "group phase",
            Self::RoundRobinFinals => "round-robin finals",
            Self::KnockoutPhase => "knockout phase",
        };
        write!(f, "{repr}")
    }
}

/// Phase lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseStatus {
    #[default]
    Active,
    Completed,
}

/// Progress queries shared by every kind of phase content
#[enum_dispatch]
pub trait PhaseProgress {
    fn phase_type(&self) -> PhaseType;

    /// Every match or node is Finished or Bye
    fn is_complete(&self) -> bool;

    /// Matches or nodes still waiting for a result
    fn pending_matches(&self) -> usize;
}

/// Round-robin groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStage {
    pub groups: Vec<Group>,
}

impl PhaseProgress for GroupStage {
    fn phase_type(&self) -> PhaseType {
        PhaseType::GroupPhase
    }

    fn is_complete(&self) -> bool {
        !self.groups.is_empty() && self.groups.iter().all(Group::is_complete)
    }

    fn pending_matches(&self) -> usize {
        self.groups.iter().map(Group::pending_matches).sum()
    }
}

/// A single all-play-all group of qualifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalsStage {
    pub group: Group,
}

impl PhaseProgress for FinalsStage {
    fn phase_type(&self) -> PhaseType {
        PhaseType::RoundRobinFinals
    }

    fn is_complete(&self) -> bool {
        self.group.is_complete()
    }

    fn pending_matches(&self) -> usize {
        self.group.pending_matches()
    }
}

/// Knockout bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnockoutStage {
    pub bracket: Bracket,
}

impl PhaseProgress for KnockoutStage {
    fn phase_type(&self) -> PhaseType {
        PhaseType::KnockoutPhase
    }

    fn is_complete(&self) -> bool {
        self.bracket.is_complete()
    }

    fn pending_matches(&self) -> usize {
        self.bracket.pending_nodes()
    }
}

/// Contents of a phase
#[enum_dispatch(PhaseProgress)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhaseStage {
    GroupStage,
    FinalsStage,
    KnockoutStage,
}

/// One phase of a tournament class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentPhase {
    #[serde(default)]
    pub status: PhaseStatus,
    pub stage: PhaseStage,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TournamentPhase {
    pub fn new(stage: impl Into<PhaseStage>) -> Self {
        Self {
            status: PhaseStatus::Active,
            stage: stage.into(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn phase_type(&self) -> PhaseType {
        self.stage.phase_type()
    }

    pub fn is_complete(&self) -> bool {
        self.stage.is_complete()
    }

    pub fn is_active(&self) -> bool {
        self.status == PhaseStatus::Active
    }

    pub(crate) fn complete(&mut self) {
        self.status = PhaseStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub(crate) fn reactivate(&mut self) {
        self.status = PhaseStatus::Active;
        self.completed_at = None;
    }

    /// Groups of a group or finals phase
    pub fn groups(&self) -> &[Group] {
        match &self.stage {
            PhaseStage::GroupStage(stage) => &stage.groups,
            PhaseStage::FinalsStage(stage) => std::slice::from_ref(&stage.group),
            PhaseStage::KnockoutStage(_) => &[],
        }
    }

    pub fn groups_mut(&mut self) -> &mut [Group] {
        match &mut self.stage {
            PhaseStage::GroupStage(stage) => &mut stage.groups,
            PhaseStage::FinalsStage(stage) => std::slice::from_mut(&mut stage.group),
            PhaseStage::KnockoutStage(_) => &mut [],
        }
    }

    pub fn bracket(&self) -> Option<&Bracket> {
        match &self.stage {
            PhaseStage::KnockoutStage(stage) => Some(&stage.bracket),
            _ => None,
        }
    }

    pub fn bracket_mut(&mut self) -> Option<&mut Bracket> {
        match &mut self.stage {
            PhaseStage::KnockoutStage(stage) => Some(&mut stage.bracket),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{IdAllocator, Player};

    fn group(n: i64) -> Group {
        let players = (1..=n).map(|id| Player::new(id, &format!("P{id}"))).collect();
        Group::new(1, "Group A").with_players(players)
    }

    #[test]
    fn test_empty_group_stage_is_not_complete() {
        let phase = TournamentPhase::new(GroupStage::default());
        assert_eq!(phase.phase_type(), PhaseType::GroupPhase);
        assert!(!phase.is_complete());
        assert!(phase.is_active());
    }

    #[test]
    fn test_dispatch_through_stage() {
        let mut ids = IdAllocator::new();
        let mut finals = group(3);
        finals.generate_matches(&mut ids, false);
        let phase = TournamentPhase::new(FinalsStage { group: finals });

        assert_eq!(phase.phase_type(), PhaseType::RoundRobinFinals);
        assert_eq!(phase.stage.pending_matches(), 3);
        assert_eq!(phase.groups().len(), 1);
        assert!(phase.bracket().is_none());
    }

    #[test]
    fn test_complete_and_reactivate() {
        let mut phase = TournamentPhase::new(GroupStage::default());
        phase.complete();
        assert_eq!(phase.status, PhaseStatus::Completed);
        assert!(phase.completed_at.is_some());

        phase.reactivate();
        assert!(phase.is_active());
        assert!(phase.completed_at.is_none());
    }
}
