//! Relational league store.
//!
//! A single SQLite database holds the six league tables:
//! - `owners`, `teams`, `records` (season membership and upstream records)
//! - `matchups` (one row per team per game)
//! - `champions` (derived) and `sackos` (curated)
//!
//! Every write is an upsert keyed by the table's natural primary key, so
//! replaying the same rows never changes the row count.

mod sqlite;

pub use sqlite::Store;

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store connection lock poisoned")]
    LockPoisoned,
}

/// Row counts per table, used by the sync jobs and the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub owners: usize,
    pub teams: usize,
    pub records: usize,
    pub matchups: usize,
    pub champions: usize,
    pub sackos: usize,
}
