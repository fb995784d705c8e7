//! Convert provider payloads to stored rows.
//!
//! Bridges between the typed ESPN season payload and the league model
//! types (Owner, Team, Record, Matchup). Rows that can't be tied to an
//! owner are dropped with a warning.

use std::collections::HashMap;

use tracing::warn;

use super::espn::{LeaguePayload, Member, ScheduleItem, TeamPayload, Winner};
use crate::calculate::round_to;
use crate::models::{Matchup, Owner, OwnerId, Record, Team, TeamId};

/// Every row derived from one season payload.
#[derive(Debug, Clone, Default)]
pub struct SeasonRows {
    pub year: i32,
    /// Matchup period of the title game, when the league reports it
    pub championship_period: Option<u32>,
    pub owners: Vec<Owner>,
    pub teams: Vec<Team>,
    pub records: Vec<Record>,
    pub matchups: Vec<Matchup>,
}

/// Convert a league member to an owner.
pub fn owner_from_member(member: &Member) -> Owner {
    Owner {
        id: OwnerId::from(member.id.as_str()),
        username: member.display_name.clone(),
        first_name: member.first_name.clone(),
        last_name: member.last_name.clone(),
    }
}

/// Convert a team entry to its season team and upstream record.
pub fn team_and_record(year: i32, team: &TeamPayload, owner_id: OwnerId) -> (Team, Record) {
    let overall = &team.record.overall;
    let record = Record {
        year,
        team_id: TeamId(team.id),
        owner_id: owner_id.clone(),
        standing: team.rank_calculated_final,
        wins: overall.wins,
        losses: overall.losses,
        ties: overall.ties,
        points_for: round_to(overall.points_for, 2),
        points_against: round_to(overall.points_against, 2),
        streak_length: overall.streak_length,
        streak_type: overall.streak_type.clone(),
    };
    let team = Team {
        year,
        id: TeamId(team.id),
        owner_id,
        abbreviation: team.abbrev.clone(),
        location: team.location.clone(),
        nickname: team.nickname.clone(),
    };
    (team, record)
}

/// Convert one schedule entry to matchup rows.
///
/// A game with both sides yields two mirrored rows. An entry with exactly
/// one side is a bye and yields a single row without an opponent.
/// Winner `UNDECIDED` with both sides present is pending; `TIE` sets none
/// of the outcome flags.
pub fn matchups_from_item(
    year: i32,
    item: &ScheduleItem,
    team_owners: &HashMap<u32, OwnerId>,
) -> Vec<Matchup> {
    let owner_of = |team_id: u32| {
        let owner = team_owners.get(&team_id).cloned();
        if owner.is_none() {
            warn!(
                "Season {} schedule entry {}: no owner for team {}, skipping",
                year, item.id, team_id
            );
        }
        owner
    };
    let tier = item.playoff_tier_type;

    match (&item.home, &item.away) {
        (Some(home), Some(away)) => {
            let (Some(owner_id), Some(opponent_owner_id)) =
                (owner_of(home.team_id), owner_of(away.team_id))
            else {
                return Vec::new();
            };
            let home_row = Matchup {
                year,
                matchup_id: item.matchup_period_id,
                team_id: TeamId(home.team_id),
                owner_id,
                opponent_team_id: Some(TeamId(away.team_id)),
                opponent_owner_id: Some(opponent_owner_id),
                team_score: round_to(home.total_points, 2),
                opponent_team_score: Some(round_to(away.total_points, 2)),
                is_win: item.winner == Winner::Home,
                is_loss: item.winner == Winner::Away,
                is_pending: item.winner == Winner::Undecided,
                is_bye: false,
                is_playoffs: tier.is_playoffs(),
                is_consolation: tier.is_consolation(),
            };
            match home_row.mirrored() {
                Some(away_row) => vec![home_row, away_row],
                None => vec![home_row],
            }
        }
        (Some(side), None) | (None, Some(side)) => {
            let Some(owner_id) = owner_of(side.team_id) else {
                return Vec::new();
            };
            vec![Matchup {
                year,
                matchup_id: item.matchup_period_id,
                team_id: TeamId(side.team_id),
                owner_id,
                opponent_team_id: None,
                opponent_owner_id: None,
                team_score: round_to(side.total_points, 2),
                opponent_team_score: None,
                is_win: false,
                is_loss: false,
                is_pending: false,
                is_bye: true,
                is_playoffs: tier.is_playoffs(),
                is_consolation: tier.is_consolation(),
            }]
        }
        (None, None) => {
            warn!(
                "Season {} schedule entry {} has no teams, skipping",
                year, item.id
            );
            Vec::new()
        }
    }
}

/// Convert a full season payload.
pub fn season_rows(payload: &LeaguePayload) -> SeasonRows {
    let year = payload.season_id;
    let mut rows = SeasonRows {
        year,
        championship_period: payload.settings.schedule_settings.championship_period(),
        owners: payload.members.iter().map(owner_from_member).collect(),
        ..SeasonRows::default()
    };

    let mut team_owners: HashMap<u32, OwnerId> = HashMap::new();
    for team in &payload.teams {
        let Some(owner) = team.owner() else {
            warn!("Season {}: team {} has no owner, skipping", year, team.id);
            continue;
        };
        let owner_id = OwnerId::from(owner);
        team_owners.insert(team.id, owner_id.clone());

        let (team, record) = team_and_record(year, team, owner_id);
        rows.teams.push(team);
        rows.records.push(record);
    }

    rows.matchups = payload
        .schedule
        .iter()
        .flat_map(|item| matchups_from_item(year, item, &team_owners))
        .collect();

    rows
}
