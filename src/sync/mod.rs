//! Sync orchestrator.
//!
//! Coordinates the ingestion pipeline:
//! 1. Ask the league source which seasons exist
//! 2. Fetch and convert each season payload
//! 3. Reconcile against the store and upsert what changed
//! 4. Refresh derived champions

pub mod convert;
pub mod espn;
pub mod reconcile;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::calculate::derive_champions;
use crate::models::{Champion, Matchup, Owner, OwnerId, Record, Team};
use crate::storage::Store;
use convert::{season_rows, SeasonRows};
use espn::LeaguePayload;
use reconcile::changed_rows;

/// Errors that can occur during sync.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] crate::fetch::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("No data for season {0}")]
    MissingSeason(i32),

    #[error("League source reported no seasons")]
    NoSeasons,
}

/// Where season payloads come from.
#[async_trait]
pub trait LeagueSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Every season the league has, oldest first.
    async fn seasons(&self) -> Result<Vec<i32>, SyncError>;

    /// The full payload for one season.
    async fn fetch_season(&self, year: i32) -> Result<LeaguePayload, SyncError>;
}

/// Rows written (or, in a dry run, that would be written) per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableChanges {
    pub owners: usize,
    pub teams: usize,
    pub records: usize,
    pub matchups: usize,
    pub champions: usize,
}

impl TableChanges {
    pub fn total(&self) -> usize {
        self.owners + self.teams + self.records + self.matchups + self.champions
    }
}

/// Result of a sync run.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub seasons: Vec<i32>,
    pub changes: TableChanges,
    pub dry_run: bool,
    pub duration: Duration,
}

/// Sync orchestrator.
pub struct SyncOrchestrator {
    source: Arc<dyn LeagueSource>,
    store: Arc<Store>,
    current_year: i32,
}

impl SyncOrchestrator {
    /// Create a new sync orchestrator.
    pub fn new(source: Arc<dyn LeagueSource>, store: Arc<Store>, current_year: i32) -> Self {
        Self {
            source,
            store,
            current_year,
        }
    }

    async fn fetch_rows(&self, year: i32) -> Result<SeasonRows, SyncError> {
        let payload = self.source.fetch_season(year).await?;
        if payload.season_id != year {
            return Err(SyncError::MalformedPayload(format!(
                "asked {} for season {} but got {}",
                self.source.name(),
                year,
                payload.season_id
            )));
        }
        Ok(season_rows(&payload))
    }

    /// Replace all league data with every season the source knows about.
    ///
    /// All seasons are fetched before anything is written, so a failed
    /// fetch leaves the store as it was. Sackos are kept.
    pub async fn load_history(&self) -> Result<SyncResult, SyncError> {
        let start = Instant::now();

        let seasons = self.source.seasons().await?;
        if seasons.is_empty() {
            return Err(SyncError::NoSeasons);
        }
        info!(
            "Loading {} seasons from {}: {:?}",
            seasons.len(),
            self.source.name(),
            seasons
        );

        let mut owners: BTreeMap<OwnerId, Owner> = BTreeMap::new();
        let mut teams: Vec<Team> = Vec::new();
        let mut records: Vec<Record> = Vec::new();
        let mut matchups: Vec<Matchup> = Vec::new();
        let mut title_periods: BTreeMap<i32, u32> = BTreeMap::new();

        for &year in &seasons {
            let rows = self.fetch_rows(year).await?;
            info!(
                "Season {}: {} teams, {} matchups",
                year,
                rows.teams.len(),
                rows.matchups.len()
            );
            // later seasons carry the freshest member names
            for owner in rows.owners {
                owners.insert(owner.id.clone(), owner);
            }
            if let Some(period) = rows.championship_period {
                title_periods.insert(year, period);
            }
            teams.extend(rows.teams);
            records.extend(rows.records);
            matchups.extend(rows.matchups);
        }

        let owners: Vec<Owner> = owners.into_values().collect();
        let champions = derive_champions(&matchups, &title_periods);

        self.store.truncate_league_tables()?;
        let changes = TableChanges {
            owners: self.store.upsert_owners(&owners)?,
            teams: self.store.upsert_teams(&teams)?,
            records: self.store.upsert_records(&records)?,
            matchups: self.store.upsert_matchups(&matchups)?,
            champions: self.store.upsert_champions(&champions)?,
        };

        let duration = start.elapsed();
        info!(
            "Load completed: {} owners, {} teams, {} records, {} matchups, {} champions in {:?}",
            changes.owners,
            changes.teams,
            changes.records,
            changes.matchups,
            changes.champions,
            duration
        );

        Ok(SyncResult {
            seasons,
            changes,
            dry_run: false,
            duration,
        })
    }

    /// Bring the current season up to date, writing only rows that are new
    /// or differ from what is stored.
    pub async fn update_current(&self, dry_run: bool) -> Result<SyncResult, SyncError> {
        let start = Instant::now();
        let year = self.current_year;
        let rows = self.fetch_rows(year).await?;

        let matchups = changed_rows(
            &rows.matchups,
            &self.store.matchups(Some(year))?,
            Matchup::key,
        );
        let records = changed_rows(&rows.records, &self.store.records(Some(year))?, Record::key);
        let teams = changed_rows(&rows.teams, &self.store.teams(Some(year))?, Team::key);
        let owners = changed_rows(&rows.owners, &self.store.owners()?, |o: &Owner| {
            o.id.clone()
        });
        let title_periods: BTreeMap<i32, u32> =
            rows.championship_period.map(|p| (year, p)).into_iter().collect();
        let champions = changed_rows(
            &derive_champions(&rows.matchups, &title_periods),
            &self.store.champions()?,
            |c: &Champion| c.year,
        );

        log_changes("matchups", matchups.len());
        log_changes("records", records.len());
        log_changes("teams", teams.len());
        log_changes("owners", owners.len());
        log_changes("champions", champions.len());

        let changes = TableChanges {
            owners: owners.len(),
            teams: teams.len(),
            records: records.len(),
            matchups: matchups.len(),
            champions: champions.len(),
        };

        if dry_run {
            info!("Dry run: {} rows would change", changes.total());
        } else {
            self.store.upsert_owners(&owners)?;
            self.store.upsert_teams(&teams)?;
            self.store.upsert_records(&records)?;
            self.store.upsert_matchups(&matchups)?;
            self.store.upsert_champions(&champions)?;
        }

        Ok(SyncResult {
            seasons: vec![year],
            changes,
            dry_run,
            duration: start.elapsed(),
        })
    }
}

fn log_changes(table: &str, count: usize) {
    if count == 0 {
        info!("No {} to update", table);
    } else {
        info!("Updating {} {}", count, table);
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory league source holding raw season JSON.
    pub struct MockSource {
        payloads: Mutex<HashMap<i32, serde_json::Value>>,
    }

    impl MockSource {
        pub fn new(seasons: Vec<(i32, serde_json::Value)>) -> Self {
            Self {
                payloads: Mutex::new(seasons.into_iter().collect()),
            }
        }

        pub fn set(&self, year: i32, payload: serde_json::Value) {
            self.payloads.lock().unwrap().insert(year, payload);
        }
    }

    #[async_trait]
    impl LeagueSource for MockSource {
        fn name(&self) -> &str {
            "mock"
        }

        async fn seasons(&self) -> Result<Vec<i32>, SyncError> {
            let mut years: Vec<i32> = self.payloads.lock().unwrap().keys().copied().collect();
            years.sort_unstable();
            Ok(years)
        }

        async fn fetch_season(&self, year: i32) -> Result<LeaguePayload, SyncError> {
            let payload = self
                .payloads
                .lock()
                .unwrap()
                .get(&year)
                .cloned()
                .ok_or(SyncError::MissingSeason(year))?;
            Ok(serde_json::from_value(payload)?)
        }
    }
}
