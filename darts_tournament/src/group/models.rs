//! Group and round-robin match models.

use serde::{Deserialize, Serialize};

use crate::entities::{MatchId, MatchStatus, Outcome, Player, PlayerId, Score};
use crate::rules::RoundRules;

/// Group ID type
pub type GroupId = u64;

/// A round-robin match inside a group or the finals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    #[serde(default)]
    pub id: MatchId,
    pub player1: Option<Player>,
    pub player2: Option<Player>,
    #[serde(default)]
    pub score: Score,
    pub status: MatchStatus,
    /// Winning player; `None` on a finished match means a draw
    pub winner: Option<PlayerId>,
    pub uses_sets: bool,
}

impl Match {
    pub fn new(id: MatchId, player1: Player, player2: Player, uses_sets: bool) -> Self {
        Self {
            id,
            player1: Some(player1),
            player2: Some(player2),
            score: Score::default(),
            status: MatchStatus::NotStarted,
            winner: None,
            uses_sets,
        }
    }

    /// A match without opponent, won by `player` automatically.
    pub fn bye(id: MatchId, player: Player, uses_sets: bool) -> Self {
        let winner = Some(player.id);
        Self {
            id,
            player1: Some(player),
            player2: None,
            score: Score::default(),
            status: MatchStatus::Bye,
            winner,
            uses_sets,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.status == MatchStatus::Bye || self.player2.is_none()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_draw(&self) -> bool {
        self.status == MatchStatus::Finished && self.winner.is_none()
    }

    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.player1.as_ref().is_some_and(|p| p.id == player_id)
            || self.player2.as_ref().is_some_and(|p| p.id == player_id)
    }

    /// Loser of a decided match.
    pub fn loser(&self) -> Option<PlayerId> {
        let winner = self.winner?;
        [&self.player1, &self.player2]
            .into_iter()
            .flatten()
            .map(|p| p.id)
            .find(|id| *id != winner)
    }

    /// Store `score`, decide the winner and finish the match.
    ///
    /// Re-entering a score on a finished match overwrites the old result.
    pub fn record_result(&mut self, score: Score, rules: &RoundRules) -> Result<Outcome, String> {
        if self.is_bye() {
            return Err("a bye has no result to enter".to_string());
        }
        let outcome = rules.resolve(&score, self.uses_sets)?;

        self.winner = match outcome {
            Outcome::Player1 => self.player1.as_ref().map(|p| p.id),
            Outcome::Player2 => self.player2.as_ref().map(|p| p.id),
            Outcome::Draw => None,
        };
        self.score = score;
        self.status = MatchStatus::Finished;
        Ok(outcome)
    }

    /// Mark the match as being played.
    pub fn start(&mut self) -> Result<(), String> {
        match self.status {
            MatchStatus::NotStarted if !self.is_bye() => {
                self.status = MatchStatus::InProgress;
                Ok(())
            }
            MatchStatus::InProgress => Ok(()),
            status => Err(format!("cannot start a match that is {status}")),
        }
    }
}

/// A round-robin group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub players: Vec<Player>,
    #[serde(default)]
    pub matches: Vec<Match>,
}

impl Group {
    pub fn new(id: GroupId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            players: Vec::new(),
            matches: Vec::new(),
        }
    }

    pub fn with_players(mut self, players: Vec<Player>) -> Self {
        for player in players {
            self.add_player(player);
        }
        self
    }

    /// Add a player. Returns `false` if the player already is in the group.
    pub fn add_player(&mut self, player: Player) -> bool {
        if self.players.contains(&player) {
            return false;
        }
        self.players.push(player);
        true
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    pub fn find_match(&self, id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn find_match_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Every match is Finished or Bye.
    ///
    /// A group with two or more players and no matches has not been drawn
    /// yet and is therefore not complete.
    pub fn is_complete(&self) -> bool {
        if self.players.len() >= 2 && self.matches.is_empty() {
            return false;
        }
        self.matches.iter().all(Match::is_terminal)
    }

    pub fn pending_matches(&self) -> usize {
        self.matches.iter().filter(|m| !m.is_terminal()).count()
    }
}
