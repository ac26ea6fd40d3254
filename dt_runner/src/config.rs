//! Runner configuration management.
//!
//! Consolidates all environment variable reads and turns them into the
//! [`GameRules`] and field size a simulation runs with.

use darts_tournament::rules::{
    FinishMode, GameMode, GameRules, KnockoutMode, PostGroupPhaseMode, SeedingMode,
};

/// Values given on the command line; they win over the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub players: Option<usize>,
    pub groups: Option<usize>,
    pub seed: Option<u64>,
}

/// Complete simulation configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Number of players registered in the class
    pub players: usize,
    /// Number of groups in the group phase
    pub groups: usize,
    /// RNG seed for draws and scores; fresh entropy when absent
    pub seed: Option<u64>,
    /// Rules handed to the tournament class
    pub rules: GameRules,
}

impl RunnerConfig {
    /// Load configuration from `DT_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to a value that does not parse
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let defaults = GameRules::default();

        let rules = GameRules {
            game_mode: parse_choice("DT_GAME_MODE", defaults.game_mode, parse_game_mode)?,
            finish_mode: parse_choice("DT_FINISH_MODE", defaults.finish_mode, parse_finish_mode)?,
            play_with_sets: parse_env_or("DT_PLAY_SETS", defaults.play_with_sets)?,
            sets_to_win: parse_env_or("DT_SETS_TO_WIN", defaults.sets_to_win)?,
            legs_to_win: parse_env_or("DT_LEGS_TO_WIN", defaults.legs_to_win)?,
            post_group_phase_mode: parse_choice(
                "DT_POST_GROUP_PHASE",
                PostGroupPhaseMode::KnockoutBracket,
                parse_post_group_phase,
            )?,
            qualifying_players_per_group: parse_env_or(
                "DT_QUALIFIERS_PER_GROUP",
                defaults.qualifying_players_per_group,
            )?,
            knockout_mode: parse_choice(
                "DT_KNOCKOUT_MODE",
                defaults.knockout_mode,
                parse_knockout_mode,
            )?,
            include_group_phase_losers_bracket: parse_env_or(
                "DT_LOSERS_BRACKET",
                defaults.include_group_phase_losers_bracket,
            )?,
            finals_followed_by_knockout: parse_env_or(
                "DT_FINALS_THEN_KNOCKOUT",
                defaults.finals_followed_by_knockout,
            )?,
            seeding: parse_choice("DT_SEEDING", defaults.seeding, parse_seeding)?,
            ..defaults
        };

        let players = match overrides.players {
            Some(players) => players,
            None => parse_env_or("DT_PLAYERS", 16)?,
        };
        let groups = match overrides.groups {
            Some(groups) => groups,
            None => parse_env_or("DT_GROUPS", 4)?,
        };
        let seed = match overrides.seed {
            Some(seed) => Some(seed),
            None => parse_env_opt("DT_SEED")?,
        };

        Ok(RunnerConfig {
            players,
            groups,
            seed,
            rules,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players < 2 {
            return Err(ConfigError::Invalid {
                var: "DT_PLAYERS".to_string(),
                reason: "Must be at least 2".to_string(),
            });
        }

        if self.groups == 0 || self.groups > self.players {
            return Err(ConfigError::Invalid {
                var: "DT_GROUPS".to_string(),
                reason: format!("Must be between 1 and the player count ({})", self.players),
            });
        }

        self.rules.validate().map_err(|reason| ConfigError::Invalid {
            var: "DT_*".to_string(),
            reason,
        })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Unknown value {value:?} for {var}, expected one of: {expected}")]
    UnknownChoice {
        var: String,
        value: String,
        expected: &'static str,
    },
}

/// Helper to parse environment variable with default fallback
///
/// Unset or empty variables fall back; set but unparsable ones are errors.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_env_opt(key)?.unwrap_or(default))
}

fn parse_env_opt<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map(Some)
                .map_err(|err: T::Err| ConfigError::Invalid {
                    var: key.to_string(),
                    reason: err.to_string(),
                })
        }
        _ => Ok(None),
    }
}

/// Parse a keyword variable with one of the `parse_*` tables below
fn parse_choice<T>(
    key: &str,
    default: T,
    parse: fn(&str) -> Result<T, &'static str>,
) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            parse(&raw.trim().to_lowercase()).map_err(|expected| ConfigError::UnknownChoice {
                var: key.to_string(),
                value: raw,
                expected,
            })
        }
        _ => Ok(default),
    }
}

fn parse_game_mode(value: &str) -> Result<GameMode, &'static str> {
    match value {
        "301" => Ok(GameMode::Points301),
        "501" => Ok(GameMode::Points501),
        "701" => Ok(GameMode::Points701),
        "cricket" => Ok(GameMode::Cricket),
        _ => Err("301, 501, 701, cricket"),
    }
}

fn parse_finish_mode(value: &str) -> Result<FinishMode, &'static str> {
    match value {
        "single" | "single-out" => Ok(FinishMode::SingleOut),
        "double" | "double-out" => Ok(FinishMode::DoubleOut),
        "master" | "master-out" => Ok(FinishMode::MasterOut),
        _ => Err("single-out, double-out, master-out"),
    }
}

fn parse_post_group_phase(value: &str) -> Result<PostGroupPhaseMode, &'static str> {
    match value {
        "none" => Ok(PostGroupPhaseMode::None),
        "finals" | "round-robin-finals" => Ok(PostGroupPhaseMode::RoundRobinFinals),
        "knockout" => Ok(PostGroupPhaseMode::KnockoutBracket),
        _ => Err("none, finals, knockout"),
    }
}

fn parse_knockout_mode(value: &str) -> Result<KnockoutMode, &'static str> {
    match value {
        "single" | "single-elimination" => Ok(KnockoutMode::SingleElimination),
        "double" | "double-elimination" => Ok(KnockoutMode::DoubleElimination),
        _ => Err("single, double"),
    }
}

fn parse_seeding(value: &str) -> Result<SeedingMode, &'static str> {
    match value {
        "random" => Ok(SeedingMode::Random),
        "positional" => Ok(SeedingMode::Positional),
        _ => Err("random, positional"),
    }
}
