//! Derived report rows.

use serde::{Deserialize, Serialize};

use super::{OwnerId, TeamId};

/// Which part of the season a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    #[default]
    Regular,
    Playoffs,
}

impl MatchType {
    pub fn is_playoffs(self) -> bool {
        matches!(self, MatchType::Playoffs)
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Regular => write!(f, "regular"),
            MatchType::Playoffs => write!(f, "playoffs"),
        }
    }
}

impl std::str::FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "regular" => Ok(MatchType::Regular),
            "playoffs" | "playoff" => Ok(MatchType::Playoffs),
            other => Err(format!("unknown matchup type: {}", other)),
        }
    }
}

/// One owner's line in a standings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub owner_id: OwnerId,

    /// Display name, when the owner is known
    pub owner_name: Option<String>,

    pub wins: u32,
    pub losses: u32,
    pub ties: u32,

    /// wins / games, 4 decimal places
    pub win_percentage: f64,

    pub points_for: f64,
    pub points_against: f64,

    /// 2 decimal places
    pub avg_points_for: f64,
    pub avg_points_against: f64,

    pub championships: u32,
    pub sackos: u32,
}

/// Lifetime record against a single opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentRecord {
    pub opponent_owner_id: OwnerId,
    pub opponent_name: Option<String>,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

/// Head-to-head tally between two owners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHeadRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

/// Run of identical results between two owners, most recent first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinStreak {
    pub streak: u32,

    /// Team (from this week's game) on the winning side of the run
    pub streak_owner: Option<TeamId>,
}

/// A team's season record going into a given week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_type_parse() {
        assert_eq!("regular".parse::<MatchType>().unwrap(), MatchType::Regular);
        assert_eq!("Playoffs".parse::<MatchType>().unwrap(), MatchType::Playoffs);
        assert!("consolation".parse::<MatchType>().is_err());
    }

    #[test]
    fn test_match_type_default_and_serde() {
        assert_eq!(MatchType::default(), MatchType::Regular);
        assert_eq!(
            serde_json::to_string(&MatchType::Playoffs).unwrap(),
            "\"playoffs\""
        );
        assert!(MatchType::Playoffs.is_playoffs());
        assert!(!MatchType::Regular.is_playoffs());
    }
}
