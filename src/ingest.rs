//! Offline ingestion from saved season payloads.
//!
//! A fixture directory holds one `league_<year>.json` file per season, in
//! the same shape the provider returns: either the season object itself or
//! the history endpoint's one-element array.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::sync::espn::LeaguePayload;
use crate::sync::{LeagueSource, SyncError};

#[derive(Deserialize)]
#[serde(untagged)]
enum SeasonFile {
    Season(Box<LeaguePayload>),
    History(Vec<LeaguePayload>),
}

/// League source backed by a directory of JSON files.
pub struct FixtureSource {
    dir: PathBuf,
}

impl FixtureSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// File holding a season's payload.
    pub fn path_for(&self, year: i32) -> PathBuf {
        self.dir.join(format!("league_{}.json", year))
    }

    fn year_from_file_name(name: &str) -> Option<i32> {
        name.strip_prefix("league_")?
            .strip_suffix(".json")?
            .parse()
            .ok()
    }
}

#[async_trait]
impl LeagueSource for FixtureSource {
    fn name(&self) -> &str {
        "fixtures"
    }

    async fn seasons(&self) -> Result<Vec<i32>, SyncError> {
        let mut years = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            match name.to_str().and_then(Self::year_from_file_name) {
                Some(year) => years.push(year),
                None => debug!("Ignoring {:?} in fixture directory", name),
            }
        }
        years.sort_unstable();
        info!(
            "Found {} season fixtures in {}",
            years.len(),
            self.dir.display()
        );
        Ok(years)
    }

    async fn fetch_season(&self, year: i32) -> Result<LeaguePayload, SyncError> {
        let path = self.path_for(year);
        if !path.exists() {
            warn!("No fixture at {}", path.display());
            return Err(SyncError::MissingSeason(year));
        }

        let content = fs::read_to_string(&path).await?;
        match serde_json::from_str::<SeasonFile>(&content)? {
            SeasonFile::Season(payload) => Ok(*payload),
            SeasonFile::History(payloads) => payloads
                .into_iter()
                .next()
                .ok_or_else(|| SyncError::MalformedPayload(format!("{} is empty", path.display()))),
        }
    }
}
