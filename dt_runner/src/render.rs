//! Plain-text views of a tournament class for the terminal.

use std::fmt;

use darts_tournament::{
    Bracket, RepairReport, TournamentClass,
    bracket::{BracketMatchNode, BracketType, Slot},
    entities::MatchStatus,
    group::{Group, calculate_standings},
    tournament::TournamentPhase,
};

/// The whole class: header, every phase and the champion.
pub struct ClassView<'a>(pub &'a TournamentClass);

impl fmt::Display for ClassView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = self.0;
        writeln!(f, "{} ({})", class.name, class.id)?;
        writeln!(
            f,
            "{} players, {} {}, first to {} legs, then {}",
            class.players().len(),
            class.rules.game_mode,
            class.rules.finish_mode,
            class.rules.legs_to_win,
            class.rules.post_group_phase_mode,
        )?;

        for (idx, phase) in class.phases().iter().enumerate() {
            writeln!(f)?;
            if idx == class.current_phase_index() {
                writeln!(f, "<- current phase")?;
            }
            write!(f, "{}", PhaseView(phase))?;
        }

        writeln!(f)?;
        match class.champion() {
            Some(champion) => writeln!(f, "Champion: {champion}"),
            None => writeln!(f, "Champion: not decided yet"),
        }
    }
}

/// One phase: group tables or the bracket.
pub struct PhaseView<'a>(pub &'a TournamentPhase);

impl fmt::Display for PhaseView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = self.0;
        let state = if phase.is_complete() { "completed" } else { "active" };
        writeln!(f, "== {} ({state}) ==", phase.phase_type())?;

        for group in phase.groups() {
            write!(f, "{}", StandingsView(group))?;
        }
        if let Some(bracket) = phase.bracket() {
            write!(f, "{}", BracketView(bracket))?;
        }
        Ok(())
    }
}

/// Standings table of a group.
pub struct StandingsView<'a>(pub &'a Group);

impl fmt::Display for StandingsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = self.0;
        let open = group.pending_matches();
        if open > 0 {
            writeln!(f, "{} ({open} open)", group.name)?;
        } else {
            writeln!(f, "{}", group.name)?;
        }
        writeln!(
            f,
            "  {:>3}  {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>7} {:>5}",
            "#", "Player", "P", "W", "D", "L", "Pts", "Legs", "+/-"
        )?;

        for row in calculate_standings(group) {
            writeln!(
                f,
                "  {:>3}  {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>7} {:>+5}",
                row.position,
                row.player.name,
                row.played,
                row.wins,
                row.draws,
                row.losses,
                row.points,
                format!("{}:{}", row.legs_won, row.legs_lost),
                row.leg_difference(),
            )?;
        }
        Ok(())
    }
}

/// Bracket listing, round by round.
pub struct BracketView<'a>(pub &'a Bracket);

impl fmt::Display for BracketView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bracket = self.0;
        for bracket_type in [BracketType::Winner, BracketType::Loser] {
            let rounds = bracket.rounds(bracket_type);
            if rounds.is_empty() {
                continue;
            }
            let heading = match bracket_type {
                BracketType::Winner => "Winner bracket",
                BracketType::Loser => "Loser bracket",
            };
            writeln!(f, "{heading}")?;
            for round in rounds {
                writeln!(f, "  {round}")?;
                for node in bracket.nodes_in_round(bracket_type, round) {
                    writeln!(f, "    {}", NodeLine(node))?;
                }
            }
        }
        Ok(())
    }
}

struct NodeLine<'a>(&'a BracketMatchNode);

impl fmt::Display for NodeLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.0;
        write!(
            f,
            "[{}] {} vs {}",
            node.id,
            SlotLabel(&node.slot1),
            SlotLabel(&node.slot2)
        )?;

        if node.is_void() {
            return write!(f, "  (void)");
        }
        match (node.status, &node.winner) {
            (MatchStatus::Finished, Some(winner)) => match &node.score {
                Some(score) => write!(f, "  {score}  -> {winner}"),
                None => write!(f, "  -> {winner}"),
            },
            (MatchStatus::Bye, Some(winner)) => write!(f, "  bye -> {winner}"),
            (status, _) => write!(f, "  ({status})"),
        }
    }
}

struct SlotLabel<'a>(&'a Slot);

impl fmt::Display for SlotLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.0.player, &self.0.source) {
            (Some(player), _) => write!(f, "{player}"),
            (None, Some(source)) if source.take_winner => write!(f, "winner of {}", source.node),
            (None, Some(source)) => write!(f, "loser of {}", source.node),
            (None, None) => write!(f, "-"),
        }
    }
}

/// One line per repair step taken.
pub struct ReportView<'a>(pub &'a RepairReport);

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        if report.is_clean() {
            return writeln!(f, "Document is consistent, nothing repaired");
        }
        if report.created_group_phase {
            writeln!(f, "Created the missing group phase")?;
        }
        if report.clamped_current_phase {
            writeln!(f, "Reset an out-of-range current phase")?;
        }
        if report.assigned_ids > 0 {
            writeln!(f, "Assigned {} missing id(s)", report.assigned_ids)?;
        }
        if report.regenerated_finals_matches > 0 {
            writeln!(
                f,
                "Generated {} finals match(es)",
                report.regenerated_finals_matches
            )?;
        }
        Ok(())
    }
}
