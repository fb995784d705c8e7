//! League membership rows: owners, season teams and their upstream records.

use serde::{Deserialize, Serialize};

use super::{OwnerId, TeamId};

/// A person who manages one team per season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl Owner {
    /// "First Last", falling back to the username when both are blank.
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string();
        if name.is_empty() {
            self.username.clone()
        } else {
            name
        }
    }
}

/// A season-scoped franchise. Keyed by `(year, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub year: i32,
    pub id: TeamId,
    pub owner_id: OwnerId,
    pub abbreviation: String,
    pub location: String,
    pub nickname: String,
}

impl Team {
    pub fn key(&self) -> (i32, TeamId) {
        (self.year, self.id)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.location, self.nickname)
            .trim()
            .to_string()
    }
}

/// Regular-season record for one team in one year, as reported upstream.
/// Keyed by `(year, team_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub year: i32,
    pub team_id: TeamId,
    pub owner_id: OwnerId,
    pub standing: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub points_against: f64,
    pub streak_length: u32,
    pub streak_type: String,
}

impl Record {
    pub fn key(&self) -> (i32, TeamId) {
        (self.year, self.team_id)
    }
}

/// Winner of the playoff bracket for a year. Derived from matchups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Champion {
    pub year: i32,
    pub owner_id: OwnerId,
}

/// Last-place designation for a year. Curated by hand, never computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sacko {
    pub year: i32,
    pub owner_id: OwnerId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_full_name() {
        let owner = Owner {
            id: "o1".into(),
            username: "jdoe".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
        };
        assert_eq!(owner.full_name(), "Jane Doe");
    }

    #[test]
    fn test_owner_full_name_falls_back_to_username() {
        let owner = Owner {
            id: "o1".into(),
            username: "jdoe".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        };
        assert_eq!(owner.full_name(), "jdoe");
    }

    #[test]
    fn test_team_display_name() {
        let team = Team {
            year: 2019,
            id: TeamId(3),
            owner_id: "o1".into(),
            abbreviation: "GOAT".to_string(),
            location: "Gotham".to_string(),
            nickname: "Goats".to_string(),
        };
        assert_eq!(team.display_name(), "Gotham Goats");
        assert_eq!(team.key(), (2019, TeamId(3)));
    }
}
