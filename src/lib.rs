//! # ffb-ledger
//!
//! Fantasy football league history: ingestion from ESPN, a SQLite store,
//! and standings, head-to-head and weekly reports over it.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (owners, teams, records, matchups, report rows)
//! - **storage**: SQLite store with idempotent upserts
//! - **calculate**: Standings, head-to-head, streak and weekly computations
//! - **reports**: Query service composing store reads with calculations
//! - **fetch**: HTTP client for the upstream provider
//! - **sync**: Season payloads, conversion and reconciliation
//! - **ingest**: Offline season payloads from disk
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod ingest;
pub mod models;
pub mod reports;
pub mod storage;
pub mod sync;

pub use models::*;
