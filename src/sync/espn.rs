//! ESPN fantasy football API client.
//!
//! Fetches league seasons (settings, members, teams and the matchup
//! schedule) from the ESPN v3 API. All ESPN API specifics are isolated in
//! this module so endpoint changes are easy to fix.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::{LeagueSource, SyncError};
use crate::fetch::{FetchError, Fetcher};

/// Default API base for football leagues.
pub const ESPN_API_BASE: &str = "https://fantasy.espn.com/apis/v3/games/ffl";

/// Views requested for a full season: settings, teams and scores.
const SEASON_VIEWS: [&str; 3] = ["mSettings", "mTeam", "mMatchupScore"];

// ── ESPN API response types ─────────────────────────────────────────────────

/// One season of a league, as returned by the league endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaguePayload {
    pub season_id: i32,

    #[serde(default)]
    pub settings: LeagueSettings,

    #[serde(default)]
    pub status: LeagueStatus,

    #[serde(default)]
    pub members: Vec<Member>,

    #[serde(default)]
    pub teams: Vec<TeamPayload>,

    #[serde(default)]
    pub schedule: Vec<ScheduleItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueSettings {
    #[serde(default)]
    pub schedule_settings: ScheduleSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleSettings {
    /// Regular-season matchup periods
    pub matchup_period_count: u32,

    pub playoff_team_count: u32,
}

impl ScheduleSettings {
    /// Matchup period of the title game: the regular season plus one period
    /// per bracket round. `None` when the league sent no schedule settings.
    pub fn championship_period(&self) -> Option<u32> {
        if self.matchup_period_count == 0 || self.playoff_team_count < 2 {
            return None;
        }
        let rounds = u32::BITS - (self.playoff_team_count - 1).leading_zeros();
        Some(self.matchup_period_count + rounds)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeagueStatus {
    /// Earlier seasons of this league
    pub previous_seasons: Vec<i32>,
}

/// A league member (a potential owner).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPayload {
    pub id: u32,

    #[serde(default)]
    pub abbrev: String,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub nickname: String,

    pub primary_owner: Option<String>,

    #[serde(default)]
    pub owners: Vec<String>,

    /// Final standing (0 while the season is running)
    #[serde(default)]
    pub rank_calculated_final: u32,

    #[serde(default)]
    pub record: TeamRecordPayload,
}

impl TeamPayload {
    /// Primary owner, falling back to the first listed co-owner.
    pub fn owner(&self) -> Option<&str> {
        self.primary_owner
            .as_deref()
            .or_else(|| self.owners.first().map(String::as_str))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamRecordPayload {
    pub overall: RecordLine,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordLine {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub points_against: f64,
    pub streak_length: u32,
    pub streak_type: String,
}

/// One scheduled game (or bye) in a matchup period.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: u32,
    pub matchup_period_id: u32,
    pub home: Option<MatchupSide>,
    pub away: Option<MatchupSide>,

    #[serde(default)]
    pub winner: Winner,

    #[serde(default)]
    pub playoff_tier_type: PlayoffTierType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupSide {
    pub team_id: u32,

    #[serde(default)]
    pub total_points: f64,

    #[serde(default)]
    pub adjustment: f64,

    #[serde(default)]
    pub tiebreak: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Winner {
    Home,
    Away,
    Tie,
    #[default]
    Undecided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayoffTierType {
    #[default]
    None,
    WinnersBracket,
    LosersConsolationLadder,
    WinnersConsolationLadder,
    #[serde(other)]
    Other,
}

impl PlayoffTierType {
    pub fn is_playoffs(self) -> bool {
        self == PlayoffTierType::WinnersBracket
    }

    pub fn is_consolation(self) -> bool {
        matches!(
            self,
            PlayoffTierType::LosersConsolationLadder | PlayoffTierType::WinnersConsolationLadder
        )
    }
}

// ── Client ──────────────────────────────────────────────────────────────────

/// League client for one ESPN league.
pub struct EspnClient {
    fetcher: Fetcher,
    api_base: String,
    league_id: u64,
    current_year: i32,
}

impl EspnClient {
    pub fn new(fetcher: Fetcher, api_base: String, league_id: u64, current_year: i32) -> Self {
        let api_base = api_base.trim_end_matches('/').to_string();
        Self {
            fetcher,
            api_base,
            league_id,
            current_year,
        }
    }

    /// Endpoint for a season. The running season lives under `seasons/`,
    /// finished ones under `leagueHistory/`.
    pub fn season_url(&self, year: i32, views: &[&str]) -> Result<Url, FetchError> {
        let url_str = if year == self.current_year {
            format!(
                "{}/seasons/{}/segments/0/leagues/{}",
                self.api_base, year, self.league_id
            )
        } else {
            format!(
                "{}/leagueHistory/{}?seasonId={}",
                self.api_base, self.league_id, year
            )
        };
        let mut url = Url::parse(&url_str)
            .map_err(|e| FetchError::InvalidUrl(format!("Bad ESPN league URL: {}", e)))?;
        {
            let mut query = url.query_pairs_mut();
            for view in views {
                query.append_pair("view", view);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl LeagueSource for EspnClient {
    fn name(&self) -> &str {
        "espn"
    }

    async fn seasons(&self) -> Result<Vec<i32>, SyncError> {
        let url = self.season_url(self.current_year, &["mSettings"])?;
        let payload: LeaguePayload = self.fetcher.get_json(&url).await?;

        let mut years = payload.status.previous_seasons;
        years.push(self.current_year);
        years.sort_unstable();
        years.dedup();
        info!("ESPN: league {} has seasons {:?}", self.league_id, years);
        Ok(years)
    }

    async fn fetch_season(&self, year: i32) -> Result<LeaguePayload, SyncError> {
        let url = self.season_url(year, &SEASON_VIEWS)?;
        let payload = if year == self.current_year {
            self.fetcher.get_json::<LeaguePayload>(&url).await?
        } else {
            // History endpoint wraps the season in an array
            self.fetcher
                .get_json::<Vec<LeaguePayload>>(&url)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    SyncError::MalformedPayload(format!("empty league history for {}", year))
                })?
        };
        debug!(
            "ESPN: season {} has {} teams and {} schedule entries",
            year,
            payload.teams.len(),
            payload.schedule.len()
        );
        Ok(payload)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    /// A four-team season: two regular weeks, a playoff semifinal week with
    /// a bye, and a final week with a third-place consolation game.
    pub fn season_json(year: i32) -> Value {
        json!({
            "seasonId": year,
            "settings": {
                "scheduleSettings": {
                    "matchupPeriodCount": 2,
                    "matchupPeriodLength": 1,
                    "playoffMatchupPeriodLength": 1,
                    "playoffTeamCount": 3
                }
            },
            "status": { "previousSeasons": [] },
            "members": [
                { "id": "{A}", "displayName": "amy", "firstName": "Amy", "lastName": "Adams" },
                { "id": "{B}", "displayName": "ben", "firstName": "Ben", "lastName": "Brown" },
                { "id": "{C}", "displayName": "cat", "firstName": "Cat", "lastName": "Cole" },
                { "id": "{D}", "displayName": "dan", "firstName": "Dan", "lastName": "Dunn" }
            ],
            "teams": [
                team(1, "{A}", "Austin", "Ants", 1, 0, 1, 210.75, 190.25),
                team(2, "{B}", "Boston", "Bears", 1, 1, 0, 190.25, 199.25),
                team(3, "{C}", "Chicago", "Cubs", 0, 1, 1, 180.0, 195.0),
                team(4, "{D}", "Denver", "Dogs", 1, 1, 0, 183.5, 180.0)
            ],
            "schedule": [
                game(1, 1, (1, 110.75), Some((2, 90.25)), "HOME", "NONE"),
                game(2, 1, (3, 80.0), Some((4, 95.0)), "AWAY", "NONE"),
                game(3, 2, (1, 100.0), Some((3, 100.0)), "TIE", "NONE"),
                game(4, 2, (2, 100.0), Some((4, 88.5)), "HOME", "NONE"),
                game(5, 3, (1, 120.0), Some((3, 99.0)), "HOME", "WINNERS_BRACKET"),
                game(6, 3, (2, 0.0), None, "UNDECIDED", "WINNERS_BRACKET"),
                game(7, 4, (1, 101.0), Some((2, 111.5)), "AWAY", "WINNERS_BRACKET"),
                game(8, 4, (3, 90.0), Some((4, 80.0)), "HOME", "WINNERS_CONSOLATION_LADDER")
            ]
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn team(
        id: u32,
        owner: &str,
        location: &str,
        nickname: &str,
        wins: u32,
        losses: u32,
        ties: u32,
        points_for: f64,
        points_against: f64,
    ) -> Value {
        json!({
            "id": id,
            "abbrev": &location[..3].to_uppercase(),
            "location": location,
            "nickname": nickname,
            "primaryOwner": owner,
            "owners": [owner],
            "rankCalculatedFinal": id,
            "record": {
                "overall": {
                    "wins": wins,
                    "losses": losses,
                    "ties": ties,
                    "pointsFor": points_for,
                    "pointsAgainst": points_against,
                    "streakLength": 1,
                    "streakType": "WIN"
                }
            }
        })
    }

    pub fn game(
        id: u32,
        period: u32,
        home: (u32, f64),
        away: Option<(u32, f64)>,
        winner: &str,
        tier: &str,
    ) -> Value {
        let mut item = json!({
            "id": id,
            "matchupPeriodId": period,
            "home": { "teamId": home.0, "totalPoints": home.1, "adjustment": 0.0, "tiebreak": 0.0 },
            "winner": winner,
            "playoffTierType": tier
        });
        if let Some((team_id, points)) = away {
            item["away"] = json!({ "teamId": team_id, "totalPoints": points });
        }
        item
    }
}
