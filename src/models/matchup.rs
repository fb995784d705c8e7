//! One team's side of one scored game.

use serde::{Deserialize, Serialize};

use super::{OwnerId, TeamId};

/// Result of a completed game from the row owner's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

/// One team's participation in one game.
///
/// `(year, matchup_id, team_id)` is the natural key. A real game is stored
/// as two rows with scores swapped and win/loss inverted; a bye is a single
/// row with no opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub year: i32,

    /// Matchup period within the season (the "week")
    pub matchup_id: u32,

    pub team_id: TeamId,
    pub owner_id: OwnerId,
    pub opponent_team_id: Option<TeamId>,
    pub opponent_owner_id: Option<OwnerId>,
    pub team_score: f64,

    /// Absent for byes
    pub opponent_team_score: Option<f64>,

    pub is_win: bool,
    pub is_loss: bool,
    pub is_pending: bool,
    pub is_bye: bool,
    pub is_playoffs: bool,
    pub is_consolation: bool,
}

impl Matchup {
    /// Natural primary key.
    pub fn key(&self) -> (i32, u32, TeamId) {
        (self.year, self.matchup_id, self.team_id)
    }

    pub fn has_opponent(&self) -> bool {
        self.opponent_owner_id.is_some()
    }

    /// Outcome of a finished game against a real opponent. `None` for
    /// pending games and byes.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.is_pending || self.is_bye || !self.has_opponent() {
            return None;
        }
        Some(if self.is_win {
            Outcome::Win
        } else if self.is_loss {
            Outcome::Loss
        } else {
            Outcome::Tie
        })
    }

    /// The same game seen from the opponent's side.
    pub fn mirrored(&self) -> Option<Matchup> {
        let opponent_team_id = self.opponent_team_id?;
        let opponent_owner_id = self.opponent_owner_id.clone()?;
        Some(Matchup {
            year: self.year,
            matchup_id: self.matchup_id,
            team_id: opponent_team_id,
            owner_id: opponent_owner_id,
            opponent_team_id: Some(self.team_id),
            opponent_owner_id: Some(self.owner_id.clone()),
            team_score: self.opponent_team_score.unwrap_or(0.0),
            opponent_team_score: Some(self.team_score),
            is_win: self.is_loss,
            is_loss: self.is_win,
            is_pending: self.is_pending,
            is_bye: self.is_bye,
            is_playoffs: self.is_playoffs,
            is_consolation: self.is_consolation,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A completed regular-season game, `team` beating or losing to `opp`.
    pub fn game(
        year: i32,
        week: u32,
        team: (u32, &str, f64),
        opp: (u32, &str, f64),
    ) -> Matchup {
        Matchup {
            year,
            matchup_id: week,
            team_id: TeamId(team.0),
            owner_id: OwnerId::from(team.1),
            opponent_team_id: Some(TeamId(opp.0)),
            opponent_owner_id: Some(OwnerId::from(opp.1)),
            team_score: team.2,
            opponent_team_score: Some(opp.2),
            is_win: team.2 > opp.2,
            is_loss: team.2 < opp.2,
            is_pending: false,
            is_bye: false,
            is_playoffs: false,
            is_consolation: false,
        }
    }

    /// Both stored rows for one game.
    pub fn both_sides(
        year: i32,
        week: u32,
        team: (u32, &str, f64),
        opp: (u32, &str, f64),
    ) -> [Matchup; 2] {
        let home = game(year, week, team, opp);
        let away = home.mirrored().unwrap();
        [home, away]
    }

    pub fn bye(year: i32, week: u32, team: (u32, &str, f64)) -> Matchup {
        Matchup {
            year,
            matchup_id: week,
            team_id: TeamId(team.0),
            owner_id: OwnerId::from(team.1),
            opponent_team_id: None,
            opponent_owner_id: None,
            team_score: team.2,
            opponent_team_score: None,
            is_win: false,
            is_loss: false,
            is_pending: false,
            is_bye: true,
            is_playoffs: false,
            is_consolation: false,
        }
    }
}
