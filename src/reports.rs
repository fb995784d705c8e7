//! League report service.
//!
//! `LeagueReports` is built once with a store handle and handed to
//! whatever serves reports (the HTTP API, the CLI). Each call reads the
//! rows it needs and runs the aggregation in memory.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculate::{
    aggregate_by_opponent, build_standings, game_sets, head_to_head_record, prior_record,
    tally_playoff_games, tally_records, team_records_before_week, win_streak,
};
use crate::models::{
    HeadToHeadRecord, MatchType, Matchup, OpponentRecord, Owner, OwnerId, StandingsRow, TeamId,
    TeamRecord,
};
use crate::storage::{StorageError, Store};

/// A champion or Sacko entry with the owner's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrophyEntry {
    pub year: i32,
    pub owner_id: OwnerId,
    pub owner_name: Option<String>,
}

/// One owner's record against each opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRecords {
    /// Owner the records belong to, after falling back to the first owner
    pub owner_id: Option<OwnerId>,
    pub match_type: MatchType,
    pub records: Vec<OpponentRecord>,
}

/// Every game between two owners plus the overall tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupHistory {
    pub owner_id: Option<OwnerId>,
    pub opponent_owner_id: Option<OwnerId>,
    pub match_type: MatchType,
    pub record: HeadToHeadRecord,
    pub matchups: Vec<Matchup>,
}

/// One game in a weekly recap, seen from the lower team id's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecapEntry {
    pub team_id: TeamId,
    pub team: String,
    pub team_record: TeamRecord,
    pub opponent_team_id: TeamId,
    pub opponent: String,
    pub opponent_record: TeamRecord,
    pub streak: u32,

    /// Team name holding the head-to-head streak
    pub streak_owner: Option<String>,

    /// Prior meetings, not counting this week
    pub h2h_record: HeadToHeadRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByeEntry {
    pub team_id: TeamId,
    pub team: String,
}

/// Preview of one week of a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyRecap {
    pub year: i32,
    pub week: u32,
    pub entries: Vec<RecapEntry>,
    pub byes: Vec<ByeEntry>,
}

/// Query surface over the league store.
#[derive(Clone)]
pub struct LeagueReports {
    store: Arc<Store>,
}

impl LeagueReports {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Seasons with matchup data, newest first.
    pub fn years(&self) -> Result<Vec<i32>, StorageError> {
        self.store.distinct_years()
    }

    /// Owners ordered by name.
    pub fn owners(&self) -> Result<Vec<Owner>, StorageError> {
        self.store.owners()
    }

    fn owner_names(&self) -> Result<HashMap<OwnerId, String>, StorageError> {
        Ok(self
            .store
            .owners()?
            .into_iter()
            .map(|o| {
                let name = o.full_name();
                (o.id, name)
            })
            .collect())
    }

    /// First owner by name, used when a report is asked for without one.
    fn default_owner(&self, except: Option<&OwnerId>) -> Result<Option<OwnerId>, StorageError> {
        Ok(self
            .store
            .owners()?
            .into_iter()
            .map(|o| o.id)
            .find(|id| Some(id) != except))
    }

    /// Standings for one season (`Some(year)`) or across all seasons.
    pub fn standings(
        &self,
        year: Option<i32>,
        match_type: MatchType,
    ) -> Result<Vec<StandingsRow>, StorageError> {
        let tallies = match match_type {
            MatchType::Regular => tally_records(&self.store.records(year)?, year),
            MatchType::Playoffs => tally_playoff_games(&self.store.matchups(year)?, year),
        };
        let rows = build_standings(
            tallies,
            &self.store.champions()?,
            &self.store.sackos()?,
            year,
            &self.owner_names()?,
        );
        debug!(
            "Built {} standings for {:?}: {} owners",
            match_type,
            year,
            rows.len()
        );
        Ok(rows)
    }

    /// Champions, newest first.
    pub fn champions(&self) -> Result<Vec<TrophyEntry>, StorageError> {
        let names = self.owner_names()?;
        Ok(self
            .store
            .champions()?
            .into_iter()
            .map(|c| TrophyEntry {
                owner_name: names.get(&c.owner_id).cloned(),
                year: c.year,
                owner_id: c.owner_id,
            })
            .collect())
    }

    /// Sackos, newest first.
    pub fn sackos(&self) -> Result<Vec<TrophyEntry>, StorageError> {
        let names = self.owner_names()?;
        Ok(self
            .store
            .sackos()?
            .into_iter()
            .map(|s| TrophyEntry {
                owner_name: names.get(&s.owner_id).cloned(),
                year: s.year,
                owner_id: s.owner_id,
            })
            .collect())
    }

    /// Lifetime record of one owner against every opponent. Falls back to
    /// the first owner when none is given.
    pub fn h2h_records(
        &self,
        owner: Option<OwnerId>,
        match_type: MatchType,
    ) -> Result<OwnerRecords, StorageError> {
        let owner = match owner {
            Some(owner) => Some(owner),
            None => self.default_owner(None)?,
        };
        let records = match &owner {
            Some(owner) => {
                let matchups = self.store.owner_matchups(owner, match_type)?;
                aggregate_by_opponent(&matchups, &self.owner_names()?)
            }
            None => Vec::new(),
        };
        Ok(OwnerRecords {
            owner_id: owner,
            match_type,
            records,
        })
    }

    /// Games between two owners. Missing owners fall back to the first
    /// and second owner by name.
    pub fn matchup_history(
        &self,
        owner: Option<OwnerId>,
        opponent: Option<OwnerId>,
        match_type: MatchType,
    ) -> Result<MatchupHistory, StorageError> {
        let owner = match owner {
            Some(owner) => Some(owner),
            None => self.default_owner(opponent.as_ref())?,
        };
        let opponent = match opponent {
            Some(opponent) => Some(opponent),
            None => self.default_owner(owner.as_ref())?,
        };

        let matchups = match (&owner, &opponent) {
            (Some(owner), Some(opponent)) => {
                self.store.matchup_history(owner, opponent, match_type)?
            }
            _ => Vec::new(),
        };

        Ok(MatchupHistory {
            record: head_to_head_record(&matchups),
            owner_id: owner,
            opponent_owner_id: opponent,
            match_type,
            matchups,
        })
    }

    /// Distinct games in a week: pairs for real games, singletons for byes.
    pub fn week_games(&self, year: i32, week: u32) -> Result<Vec<BTreeSet<TeamId>>, StorageError> {
        Ok(game_sets(&self.store.week_matchups(year, week)?))
    }

    /// Records, streaks and prior head-to-head tallies for every game in
    /// a week.
    pub fn recap(&self, year: i32, week: u32) -> Result<WeeklyRecap, StorageError> {
        let rows = self.store.week_matchups(year, week)?;
        let season = self.store.matchups(Some(year))?;
        let records = team_records_before_week(&season, week);
        let team_names: HashMap<TeamId, String> = self
            .store
            .teams(Some(year))?
            .into_iter()
            .map(|t| (t.id, t.display_name()))
            .collect();
        let team_name = |id: TeamId| -> String {
            team_names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| format!("Team {}", id))
        };
        let record_of = |id: TeamId| records.get(&id).copied().unwrap_or_default();

        let mut recap = WeeklyRecap {
            year,
            week,
            entries: Vec::new(),
            byes: Vec::new(),
        };

        for set in game_sets(&rows) {
            let Some(&lead_id) = set.iter().next() else {
                continue;
            };
            let Some(lead) = rows.iter().find(|m| m.team_id == lead_id) else {
                continue;
            };

            let (Some(opponent_team_id), Some(opponent_owner_id)) =
                (lead.opponent_team_id, lead.opponent_owner_id.as_ref())
            else {
                recap.byes.push(ByeEntry {
                    team_id: lead.team_id,
                    team: team_name(lead.team_id),
                });
                continue;
            };

            let history =
                self.store
                    .matchup_history(&lead.owner_id, opponent_owner_id, MatchType::Regular)?;
            let streak = win_streak(lead, &history, year, week);

            recap.entries.push(RecapEntry {
                team_id: lead.team_id,
                team: team_name(lead.team_id),
                team_record: record_of(lead.team_id),
                opponent_team_id,
                opponent: team_name(opponent_team_id),
                opponent_record: record_of(opponent_team_id),
                streak: streak.streak,
                streak_owner: streak.streak_owner.map(team_name),
                h2h_record: prior_record(&history, year, week),
            });
        }

        Ok(recap)
    }
}
