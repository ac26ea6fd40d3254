//! Game rules, per-round overrides and score resolution.

use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeMap, fmt};

use crate::bracket::Round;
use crate::entities::{Outcome, Score};

/// Starting score / variant played in every leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Points301,
    Points501,
    Points701,
    Cricket,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Points301 => write!(f, "301"),
            GameMode::Points501 => write!(f, "501"),
            GameMode::Points701 => write!(f, "701"),
            GameMode::Cricket => write!(f, "cricket"),
        }
    }
}

/// How a leg has to be checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishMode {
    SingleOut,
    DoubleOut,
    MasterOut,
}

impl fmt::Display for FinishMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishMode::SingleOut => write!(f, "single out"),
            FinishMode::DoubleOut => write!(f, "double out"),
            FinishMode::MasterOut => write!(f, "master out"),
        }
    }
}

/// What follows the group phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostGroupPhaseMode {
    /// The group phase is the whole tournament.
    #[default]
    None,
    /// Qualifiers play one more all-play-all group.
    RoundRobinFinals,
    /// Qualifiers enter a knockout bracket.
    KnockoutBracket,
}

impl fmt::Display for PostGroupPhaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostGroupPhaseMode::None => write!(f, "none"),
            PostGroupPhaseMode::RoundRobinFinals => write!(f, "round robin finals"),
            PostGroupPhaseMode::KnockoutBracket => write!(f, "knockout bracket"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KnockoutMode {
    #[default]
    SingleElimination,
    DoubleElimination,
}

impl fmt::Display for KnockoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnockoutMode::SingleElimination => write!(f, "single elimination"),
            KnockoutMode::DoubleElimination => write!(f, "double elimination"),
        }
    }
}

/// How qualifiers are ordered before they are paired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedingMode {
    /// Uniform shuffle.
    #[default]
    Random,
    /// Keep the order the qualifiers arrive in.
    Positional,
}

/// Rules that apply to a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRules {
    pub game_mode: GameMode,
    pub finish_mode: FinishMode,
    /// Whether the match is decided in sets (otherwise legs).
    pub play_with_sets: bool,
    pub sets_to_win: u32,
    pub legs_to_win: u32,
}

impl Default for RoundRules {
    fn default() -> Self {
        Self {
            game_mode: GameMode::Points501,
            finish_mode: FinishMode::DoubleOut,
            play_with_sets: false,
            sets_to_win: 3,
            legs_to_win: 3,
        }
    }
}

impl RoundRules {
    /// First-to target for the deciding counter.
    pub fn target(&self, uses_sets: bool) -> u32 {
        if uses_sets {
            self.sets_to_win
        } else {
            self.legs_to_win
        }
    }

    /// Decide who won `score`.
    ///
    /// The deciding counters are sets when `uses_sets` is set, legs
    /// otherwise. A winner must have reached the target exactly and nobody
    /// may exceed it. Equal counters below the target are a draw; callers
    /// that cannot accept draws reject [`Outcome::Draw`] themselves.
    pub fn resolve(&self, score: &Score, uses_sets: bool) -> Result<Outcome, String> {
        let (first, second) = score.deciding(uses_sets);
        let target = self.target(uses_sets);
        let unit = if uses_sets { "sets" } else { "legs" };

        if first > target || second > target {
            return Err(format!(
                "{first}:{second} exceeds first to {target} {unit}"
            ));
        }

        match first.cmp(&second) {
            Ordering::Greater if first == target => Ok(Outcome::Player1),
            Ordering::Less if second == target => Ok(Outcome::Player2),
            Ordering::Greater | Ordering::Less => Err(format!(
                "{first}:{second} is not finished, the winner needs {target} {unit}"
            )),
            Ordering::Equal if first == 0 => Err("no score entered".to_string()),
            Ordering::Equal => Ok(Outcome::Draw),
        }
    }
}

/// Tournament class configuration.
///
/// The top-level game fields are the group-phase rules and the fallback for
/// every later phase that has no override of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    pub game_mode: GameMode,
    pub finish_mode: FinishMode,
    pub play_with_sets: bool,
    pub sets_to_win: u32,
    pub legs_to_win: u32,

    /// Phase that follows the group phase
    pub post_group_phase_mode: PostGroupPhaseMode,

    /// Players taken from the top of every group's standings
    pub qualifying_players_per_group: usize,

    pub knockout_mode: KnockoutMode,

    /// Seed the loser bracket with the group-phase non-qualifiers
    pub include_group_phase_losers_bracket: bool,

    /// Play a knockout bracket after the round-robin finals
    #[serde(default)]
    pub finals_followed_by_knockout: bool,

    #[serde(default)]
    pub seeding: SeedingMode,

    /// Rules for the round-robin finals; group rules when absent
    #[serde(default)]
    pub finals_rules: Option<RoundRules>,

    /// Per knockout round overrides; group rules for missing rounds
    #[serde(default)]
    pub knockout_round_rules: BTreeMap<Round, RoundRules>,
}

impl Default for GameRules {
    fn default() -> Self {
        let base = RoundRules::default();
        Self {
            game_mode: base.game_mode,
            finish_mode: base.finish_mode,
            play_with_sets: base.play_with_sets,
            sets_to_win: base.sets_to_win,
            legs_to_win: base.legs_to_win,
            post_group_phase_mode: PostGroupPhaseMode::None,
            qualifying_players_per_group: 2,
            knockout_mode: KnockoutMode::SingleElimination,
            include_group_phase_losers_bracket: false,
            finals_followed_by_knockout: false,
            seeding: SeedingMode::Random,
            finals_rules: None,
            knockout_round_rules: BTreeMap::new(),
        }
    }
}

impl GameRules {
    /// Group phase followed by a knockout bracket.
    pub fn knockout(knockout_mode: KnockoutMode, qualifying_players_per_group: usize) -> Self {
        Self {
            post_group_phase_mode: PostGroupPhaseMode::KnockoutBracket,
            knockout_mode,
            qualifying_players_per_group,
            ..Self::default()
        }
    }

    /// Group phase followed by round-robin finals.
    pub fn round_robin_finals(qualifying_players_per_group: usize) -> Self {
        Self {
            post_group_phase_mode: PostGroupPhaseMode::RoundRobinFinals,
            qualifying_players_per_group,
            ..Self::default()
        }
    }

    pub fn with_round_rules(mut self, round: Round, rules: RoundRules) -> Self {
        self.knockout_round_rules.insert(round, rules);
        self
    }

    pub fn group_rules(&self) -> RoundRules {
        RoundRules {
            game_mode: self.game_mode,
            finish_mode: self.finish_mode,
            play_with_sets: self.play_with_sets,
            sets_to_win: self.sets_to_win,
            legs_to_win: self.legs_to_win,
        }
    }

    pub fn finals_rules(&self) -> RoundRules {
        self.finals_rules.unwrap_or_else(|| self.group_rules())
    }

    /// Rules for a knockout round, falling back to the group rules.
    pub fn round_rules(&self, round: Round) -> RoundRules {
        self.knockout_round_rules
            .get(&round)
            .copied()
            .unwrap_or_else(|| self.group_rules())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let mut all = vec![("group phase".to_string(), self.group_rules())];
        if let Some(finals) = self.finals_rules {
            all.push(("finals".to_string(), finals));
        }
        for (round, rules) in &self.knockout_round_rules {
            all.push((round.to_string(), *rules));
        }

        for (name, rules) in all {
            if rules.legs_to_win == 0 {
                return Err(format!("{name}: legs to win must be at least 1"));
            }
            if rules.play_with_sets && rules.sets_to_win == 0 {
                return Err(format!("{name}: sets to win must be at least 1"));
            }
        }

        if self.post_group_phase_mode != PostGroupPhaseMode::None
            && self.qualifying_players_per_group == 0
        {
            return Err("At least one player per group must qualify".to_string());
        }

        Ok(())
    }
}
