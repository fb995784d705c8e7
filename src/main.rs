use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ffb_ledger::api::{build_router, state::AppState};
use ffb_ledger::config::AppConfig;
use ffb_ledger::fetch::Fetcher;
use ffb_ledger::ingest::FixtureSource;
use ffb_ledger::models::{OwnerId, Sacko};
use ffb_ledger::reports::LeagueReports;
use ffb_ledger::storage::Store;
use ffb_ledger::sync::espn::EspnClient;
use ffb_ledger::sync::{LeagueSource, SyncOrchestrator, SyncResult};

#[derive(Parser)]
#[command(name = "ffb-ledger")]
#[command(about = "Fantasy football league history: standings, head-to-head and weekly recaps")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Database file (overrides database_path from the config)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database tables
    InitDb {
        /// Drop and recreate every table, sackos included
        #[arg(long)]
        reset: bool,
    },

    /// Load every season from scratch
    Load {
        /// Read league_<year>.json payloads from this directory instead of ESPN
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },

    /// Apply changes from the current season
    Update {
        /// Count changes without writing them
        #[arg(long)]
        dry_run: bool,

        /// Read league_<year>.json payloads from this directory instead of ESPN
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },

    /// Record the last-place finisher for a season
    AddSacko {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        owner_id: String,
    },

    /// Remove a season's sacko
    RemoveSacko {
        #[arg(long)]
        year: i32,
    },

    /// Start the API server
    Serve {
        /// Bind address (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port number (defaults to server.port)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn load_config(path: &Path) -> Result<(AppConfig, bool)> {
    if path.exists() {
        let config = AppConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
        return Ok((config, true));
    }
    let mut config = AppConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok((config, false))
}

fn league_source(config: &AppConfig, fixtures: Option<PathBuf>) -> Result<Arc<dyn LeagueSource>> {
    if let Some(dir) = fixtures {
        return Ok(Arc::new(FixtureSource::new(dir)));
    }
    config.validate_league()?;
    let fetcher = Fetcher::new(config.fetcher_config())?;
    Ok(Arc::new(EspnClient::new(
        fetcher,
        config.fetch.base_url.clone(),
        config.league.league_id,
        config.league.current_year,
    )))
}

fn print_result(title: &str, result: &SyncResult) {
    println!("\n=== {} ===", title);
    println!("Seasons:    {:?}", result.seasons);
    println!("Owners:     {}", result.changes.owners);
    println!("Teams:      {}", result.changes.teams);
    println!("Records:    {}", result.changes.records);
    println!("Matchups:   {}", result.changes.matchups);
    println!("Champions:  {}", result.changes.champions);
    println!("Duration:   {:?}", result.duration);
    if result.dry_run {
        println!("\n(dry run - no changes written)");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, from_file) = load_config(&cli.config)?;

    // Initialize tracing
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting ffb-ledger v{}", env!("CARGO_PKG_VERSION"));
    if !from_file {
        tracing::warn!(
            "No config file at {}, using defaults",
            cli.config.display()
        );
    }

    let db_path = cli
        .database
        .clone()
        .unwrap_or_else(|| config.database_path.clone());
    let store = Arc::new(Store::open(&db_path)?);
    tracing::info!("Using database {}", db_path.display());

    match cli.command {
        Commands::InitDb { reset } => {
            if reset {
                store.reset()?;
                tracing::info!("Dropped and recreated all tables");
            }
            let counts = store.counts()?;
            println!("Database ready: {}", db_path.display());
            println!("{:?}", counts);
        }
        Commands::Load { fixtures } => {
            let source = league_source(&config, fixtures)?;
            let orchestrator =
                SyncOrchestrator::new(source, store.clone(), config.league.current_year);
            let result = orchestrator.load_history().await?;
            print_result("Load Results", &result);
        }
        Commands::Update { dry_run, fixtures } => {
            let source = league_source(&config, fixtures)?;
            let orchestrator =
                SyncOrchestrator::new(source, store.clone(), config.league.current_year);
            let result = orchestrator.update_current(dry_run).await?;
            print_result("Update Results", &result);
        }
        Commands::AddSacko { year, owner_id } => {
            let owner_id = OwnerId::from(owner_id);
            if !store.owners()?.iter().any(|o| o.id == owner_id) {
                tracing::warn!("Owner {} is not in the owners table", owner_id);
            }
            store.upsert_sacko(&Sacko { year, owner_id: owner_id.clone() })?;
            println!("Sacko {}: {}", year, owner_id);
        }
        Commands::RemoveSacko { year } => {
            if store.delete_sacko(year)? {
                println!("Removed sacko for {}", year);
            } else {
                println!("No sacko recorded for {}", year);
            }
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let state = AppState::new(LeagueReports::new(store));
            let app = build_router(state, &config.server.cors_origin);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
