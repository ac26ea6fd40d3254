//! The tournament class aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{TournamentError, TournamentResult};
use super::models::{GroupStage, PhaseType, TournamentPhase};
use crate::bracket::{self, Bracket, BracketError, NodeId, PropagationOutcome};
use crate::entities::{IdAllocator, MatchId, Player, PlayerId, Score};
use crate::group::{Group, GroupId, Match, Standing, calculate_standings};
use crate::rules::{ConfigurationError, GameRules};
use crate::seeding::Seeder;

/// One competition class: its players, rules and phases.
///
/// Every mutation either succeeds completely or leaves the class as it was.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentClass {
    pub id: Uuid,
    pub name: String,
    pub rules: GameRules,
    pub(crate) players: Vec<Player>,
    pub(crate) phases: Vec<TournamentPhase>,
    pub(crate) current_phase: usize,
    #[serde(default)]
    pub(crate) ids: IdAllocator,
    #[serde(default)]
    pub(crate) last_player_id: PlayerId,
    #[serde(skip)]
    pub(crate) seeder: Seeder,
    pub created_at: DateTime<Utc>,
}

impl TournamentClass {
    /// Create a class in its group phase.
    pub fn new(name: &str, rules: GameRules) -> TournamentResult<Self> {
        rules.validate().map_err(ConfigurationError::InvalidRules)?;

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            rules,
            players: Vec::new(),
            phases: vec![TournamentPhase::new(GroupStage::default())],
            current_phase: 0,
            ids: IdAllocator::new(),
            last_player_id: 0,
            seeder: Seeder::new(),
            created_at: Utc::now(),
        })
    }

    /// Make group draws and random seeding reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seeder = Seeder::with_seed(seed);
        self
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn phases(&self) -> &[TournamentPhase] {
        &self.phases
    }

    pub fn current_phase_index(&self) -> usize {
        self.current_phase
    }

    pub fn current_phase(&self) -> Option<&TournamentPhase> {
        self.phases.get(self.current_phase)
    }

    pub fn current_phase_type(&self) -> PhaseType {
        self.current_phase()
            .map_or(PhaseType::GroupPhase, TournamentPhase::phase_type)
    }

    /// Latest phase of the given type.
    pub fn phase(&self, phase_type: PhaseType) -> Option<&TournamentPhase> {
        self.phases
            .iter()
            .rev()
            .find(|p| p.phase_type() == phase_type)
    }

    /// Bracket of the knockout phase, if one was built.
    pub fn bracket(&self) -> Option<&Bracket> {
        self.phase(PhaseType::KnockoutPhase)
            .and_then(TournamentPhase::bracket)
    }

    /// Next id the class will hand out.
    pub fn next_id(&self) -> u64 {
        self.ids.peek()
    }

    /// Register a new player under a fresh id.
    pub fn register_player(&mut self, name: &str) -> TournamentResult<Player> {
        let player = Player::new(self.last_player_id + 1, name);
        self.add_player(player.clone())?;
        Ok(player)
    }

    /// Add a player that already has an id.
    pub fn add_player(&mut self, player: Player) -> TournamentResult<()> {
        if player.name.is_empty() {
            return Err(TournamentError::InvalidConfiguration(
                "player name must not be empty".to_string(),
            ));
        }
        if self.players.contains(&player) {
            return Err(TournamentError::DuplicatePlayer(player.id));
        }

        self.last_player_id = self.last_player_id.max(player.id);
        log::debug!("Registered {} ({}) in {}", player.name, player.id, self.name);
        self.players.push(player);
        Ok(())
    }

    /// Draw the registered players into `count` groups ("Group A", "Group
    /// B", ...) and generate their matches.
    ///
    /// Only possible while the group phase is the only phase. Redrawing
    /// discards all group results.
    ///
    /// # Returns
    ///
    /// * `usize` - Number of generated matches
    pub fn create_groups(&mut self, count: usize) -> TournamentResult<usize> {
        self.ensure_only_group_phase()?;
        if count == 0 || count > self.players.len() {
            return Err(TournamentError::InvalidConfiguration(format!(
                "cannot draw {} players into {count} groups",
                self.players.len()
            )));
        }

        let uses_sets = self.rules.group_rules().play_with_sets;
        let draws = self
            .seeder
            .draw_groups(&self.players, count, self.rules.seeding);
        let mut groups = Vec::with_capacity(count);
        let mut generated = 0;
        for (idx, players) in draws.into_iter().enumerate() {
            let mut group = Group::new(self.ids.allocate(), &group_name(idx)).with_players(players);
            generated += group.generate_matches(&mut self.ids, uses_sets);
            groups.push(group);
        }

        log::info!(
            "Drew {} players into {count} groups for {} ({generated} matches)",
            self.players.len(),
            self.name
        );
        self.phases[0] = TournamentPhase::new(GroupStage { groups });
        Ok(generated)
    }

    /// Move a player into another group and regenerate both groups.
    pub fn move_player(&mut self, player_id: PlayerId, to: GroupId) -> TournamentResult<()> {
        self.ensure_only_group_phase()?;
        let uses_sets = self.rules.group_rules().play_with_sets;
        let phase = &mut self.phases[0];

        if !phase.groups().iter().any(|g| g.id == to) {
            return Err(TournamentError::GroupNotFound(to));
        }
        let player = self
            .players
            .iter()
            .find(|p| p.id == player_id)
            .cloned()
            .ok_or_else(|| {
                TournamentError::InvalidConfiguration(format!("unknown player {player_id}"))
            })?;

        for group in phase.groups_mut() {
            let before = group.players.len();
            group.players.retain(|p| p.id != player_id);
            if group.id == to {
                group.add_player(player.clone());
            }
            if group.players.len() != before || group.id == to {
                group.generate_matches(&mut self.ids, uses_sets);
            }
        }
        Ok(())
    }

    /// Regenerate the matches of one group in the group phase.
    pub fn regenerate_group_matches(&mut self, group_id: GroupId) -> TournamentResult<usize> {
        self.ensure_only_group_phase()?;
        let uses_sets = self.rules.group_rules().play_with_sets;
        let group = self.phases[0]
            .groups_mut()
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or(TournamentError::GroupNotFound(group_id))?;
        Ok(group.generate_matches(&mut self.ids, uses_sets))
    }

    /// A match of the current group or finals phase.
    pub fn find_match(&self, id: MatchId) -> Option<&Match> {
        self.current_phase()?
            .groups()
            .iter()
            .find_map(|g| g.find_match(id))
    }

    /// Standings of a group from any phase.
    pub fn standings(&self, group_id: GroupId) -> TournamentResult<Vec<Standing>> {
        self.phases
            .iter()
            .flat_map(|p| p.groups())
            .find(|g| g.id == group_id)
            .map(calculate_standings)
            .ok_or(TournamentError::GroupNotFound(group_id))
    }

    /// Enter a result for a match or bracket node of the current phase.
    ///
    /// Group and finals matches accept draws and may be corrected while
    /// their phase is active. Knockout results propagate through the
    /// bracket and report what propagation did.
    pub fn enter_result(
        &mut self,
        id: u64,
        score: Score,
    ) -> TournamentResult<Option<PropagationOutcome>> {
        let phase_type = self.current_phase_type();
        match phase_type {
            PhaseType::KnockoutPhase => self
                .knockout_mutation(id, |graph, rules| {
                    let round = graph
                        .node(id)
                        .map(|n| n.round)
                        .ok_or(BracketError::NodeNotFound(id))?;
                    bracket::enter_result(graph, id, score, &rules.round_rules(round))
                })
                .map(Some),
            PhaseType::GroupPhase | PhaseType::RoundRobinFinals => {
                let rules = if phase_type == PhaseType::GroupPhase {
                    self.rules.group_rules()
                } else {
                    self.rules.finals_rules()
                };
                let m = self.current_match_mut(id)?;
                let outcome = m
                    .record_result(score, &rules)
                    .map_err(TournamentError::InvalidResult)?;
                log::debug!("Match {id}: {score} ({outcome:?})");
                Ok(None)
            }
        }
    }

    /// Mark a match or bracket node of the current phase as being played.
    pub fn start_match(&mut self, id: u64) -> TournamentResult<()> {
        match self.current_phase_type() {
            PhaseType::KnockoutPhase => {
                self.knockout_mutation(id, |graph, _| bracket::start_node(graph, id))
            }
            PhaseType::GroupPhase | PhaseType::RoundRobinFinals => self
                .current_match_mut(id)?
                .start()
                .map_err(TournamentError::InvalidResult),
        }
    }

    /// Award a knockout node without playing it.
    pub fn give_bye(
        &mut self,
        node: NodeId,
        winner: Option<PlayerId>,
    ) -> TournamentResult<PropagationOutcome> {
        self.knockout_mutation(node, |graph, _| bracket::give_bye(graph, node, winner))
    }

    /// Revert a bye on a knockout node.
    pub fn undo_bye(&mut self, node: NodeId) -> TournamentResult<PropagationOutcome> {
        self.knockout_mutation(node, |graph, _| bracket::undo_bye(graph, node))
    }

    /// Winner of the class once the last phase is complete.
    pub fn champion(&self) -> Option<Player> {
        if !self.is_finished() {
            return None;
        }
        let phase = self.current_phase()?;
        match phase.bracket() {
            Some(bracket) => bracket.champion().cloned(),
            None => phase
                .groups()
                .first()
                .and_then(|g| calculate_standings(g).into_iter().next())
                .map(|s| s.player),
        }
    }

    /// The current phase is complete and nothing follows it.
    pub fn is_finished(&self) -> bool {
        self.next_phase_type().is_none() && self.current_phase().is_some_and(|p| p.is_complete())
    }

    fn ensure_only_group_phase(&self) -> TournamentResult<()> {
        if self.phases.len() != 1 || self.current_phase_type() != PhaseType::GroupPhase {
            return Err(TournamentError::WrongPhase {
                actual: self.current_phase_type(),
            });
        }
        Ok(())
    }

    fn current_match_mut(&mut self, id: MatchId) -> TournamentResult<&mut Match> {
        let actual = self.current_phase_type();
        let elsewhere = self.phases.iter().enumerate().any(|(idx, p)| {
            idx != self.current_phase && p.groups().iter().any(|g| g.find_match(id).is_some())
        });
        if elsewhere {
            return Err(TournamentError::WrongPhase { actual });
        }

        self.phases
            .get_mut(self.current_phase)
            .and_then(|p| p.groups_mut().iter_mut().find_map(|g| g.find_match_mut(id)))
            .ok_or(TournamentError::MatchNotFound(id))
    }

    /// Run a bracket mutation against the current knockout phase, restoring
    /// the bracket if it fails.
    fn knockout_mutation<T>(
        &mut self,
        node: NodeId,
        op: impl FnOnce(&mut Bracket, &GameRules) -> Result<T, BracketError>,
    ) -> TournamentResult<T> {
        let actual = self.current_phase_type();
        let rules = &self.rules;
        let bracket = self
            .phases
            .get_mut(self.current_phase)
            .and_then(TournamentPhase::bracket_mut)
            .ok_or(TournamentError::WrongPhase { actual })?;

        let snapshot = bracket.clone();
        match op(&mut *bracket, rules) {
            Ok(value) => Ok(value),
            Err(err) => {
                log::debug!("Bracket node {node}: {err}, changes rolled back");
                *bracket = snapshot;
                Err(err.into())
            }
        }
    }
}

/// "Group A" to "Group Z", then numbered.
fn group_name(idx: usize) -> String {
    match u8::try_from(idx) {
        Ok(n) if n < 26 => format!("Group {}", char::from(b'A' + n)),
        _ => format!("Group {}", idx + 1),
    }
}
