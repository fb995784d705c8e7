//! Configuration loading and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::{Credentials, FetcherConfig};
use crate::sync::espn::ESPN_API_BASE;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// League identity and session cookies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Provider league id (0 = not configured)
    #[serde(default)]
    pub league_id: u64,

    /// Season treated as current; earlier seasons come from league history
    #[serde(default = "default_current_year")]
    pub current_year: i32,

    /// `swid` cookie for private leagues
    #[serde(default)]
    pub swid: Option<String>,

    /// `espn_s2` cookie for private leagues
    #[serde(default)]
    pub espn_s2: Option<String>,
}

fn default_current_year() -> i32 {
    chrono::Utc::now().year()
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            league_id: 0,
            current_year: default_current_year(),
            swid: None,
            espn_s2: None,
        }
    }
}

/// Upstream HTTP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Keep a copy of every fetched payload here
    #[serde(default)]
    pub archive_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    ESPN_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("ffb-ledger/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            archive_dir: None,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub league: LeagueConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./data/league.db")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_level: default_log_level(),
            league: LeagueConfig::default(),
            fetch: FetchConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment
    /// overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&contents)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override secrets and the league id from `ESPN_SWID`, `ESPN_S2` and
    /// `FFB_LEAGUE_ID`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(swid) = lookup("ESPN_SWID") {
            self.league.swid = Some(swid);
        }
        if let Some(espn_s2) = lookup("ESPN_S2") {
            self.league.espn_s2 = Some(espn_s2);
        }
        if let Some(id) = lookup("FFB_LEAGUE_ID").and_then(|v| v.trim().parse().ok()) {
            self.league.league_id = id;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Fetch timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if !(2000..=2100).contains(&self.league.current_year) {
            return Err(ConfigError::ValidationError(format!(
                "Current year {} is out of range",
                self.league.current_year
            )));
        }

        Ok(())
    }

    /// Validate the settings a sync needs on top of [`validate`](Self::validate).
    pub fn validate_league(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.league.league_id == 0 {
            return Err(ConfigError::ValidationError(
                "league.league_id must be set (or FFB_LEAGUE_ID)".to_string(),
            ));
        }
        Ok(())
    }

    /// Session cookies, when both are configured.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.league.swid, &self.league.espn_s2) {
            (Some(swid), Some(espn_s2)) => Some(Credentials {
                swid: swid.clone(),
                espn_s2: espn_s2.clone(),
            }),
            _ => None,
        }
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            timeout: Duration::from_secs(self.fetch.timeout_seconds),
            user_agent: self.fetch.user_agent.clone(),
            credentials: self.credentials(),
            archive_dir: self.fetch.archive_dir.clone(),
            ..FetcherConfig::default()
        }
    }
}
