//! SQLite-backed store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use super::{StorageError, TableCounts};
use crate::models::{Champion, MatchType, Matchup, Owner, OwnerId, Record, Sacko, Team, TeamId};

impl ToSql for OwnerId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for OwnerId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(OwnerId::from)
    }
}

impl ToSql for TeamId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.0)))
    }
}

impl FromSql for TeamId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        u32::column_result(value).map(TeamId)
    }
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS owners (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS teams (
        year INTEGER NOT NULL,
        id INTEGER NOT NULL,
        owner_id TEXT NOT NULL,
        abbreviation TEXT NOT NULL,
        location TEXT NOT NULL,
        nickname TEXT NOT NULL,
        PRIMARY KEY (year, id)
    );

    CREATE TABLE IF NOT EXISTS records (
        year INTEGER NOT NULL,
        team_id INTEGER NOT NULL,
        owner_id TEXT NOT NULL,
        standing INTEGER NOT NULL,
        wins INTEGER NOT NULL,
        losses INTEGER NOT NULL,
        ties INTEGER NOT NULL,
        points_for REAL NOT NULL,
        points_against REAL NOT NULL,
        streak_length INTEGER NOT NULL,
        streak_type TEXT NOT NULL,
        PRIMARY KEY (year, team_id)
    );

    CREATE TABLE IF NOT EXISTS matchups (
        year INTEGER NOT NULL,
        matchup_id INTEGER NOT NULL,
        team_id INTEGER NOT NULL,
        owner_id TEXT NOT NULL,
        opponent_team_id INTEGER,
        opponent_owner_id TEXT,
        team_score REAL NOT NULL,
        opponent_team_score REAL,
        is_win INTEGER NOT NULL,
        is_loss INTEGER NOT NULL,
        is_pending INTEGER NOT NULL,
        is_bye INTEGER NOT NULL,
        is_playoffs INTEGER NOT NULL,
        is_consolation INTEGER NOT NULL,
        PRIMARY KEY (year, matchup_id, team_id)
    );

    CREATE TABLE IF NOT EXISTS champions (
        year INTEGER PRIMARY KEY,
        owner_id TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS sackos (
        year INTEGER PRIMARY KEY,
        owner_id TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_matchups_owners ON matchups(owner_id, opponent_owner_id);
    CREATE INDEX IF NOT EXISTS idx_records_owner ON records(owner_id);
"#;

const MATCHUP_COLUMNS: &str = "year, matchup_id, team_id, owner_id, opponent_team_id, \
     opponent_owner_id, team_score, opponent_team_score, is_win, is_loss, is_pending, is_bye, \
     is_playoffs, is_consolation";

const RECORD_COLUMNS: &str = "year, team_id, owner_id, standing, wins, losses, ties, \
     points_for, points_against, streak_length, streak_type";

fn matchup_from_row(row: &Row<'_>) -> rusqlite::Result<Matchup> {
    Ok(Matchup {
        year: row.get(0)?,
        matchup_id: row.get(1)?,
        team_id: row.get(2)?,
        owner_id: row.get(3)?,
        opponent_team_id: row.get(4)?,
        opponent_owner_id: row.get(5)?,
        team_score: row.get(6)?,
        opponent_team_score: row.get(7)?,
        is_win: row.get(8)?,
        is_loss: row.get(9)?,
        is_pending: row.get(10)?,
        is_bye: row.get(11)?,
        is_playoffs: row.get(12)?,
        is_consolation: row.get(13)?,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        year: row.get(0)?,
        team_id: row.get(1)?,
        owner_id: row.get(2)?,
        standing: row.get(3)?,
        wins: row.get(4)?,
        losses: row.get(5)?,
        ties: row.get(6)?,
        points_for: row.get(7)?,
        points_against: row.get(8)?,
        streak_length: row.get(9)?,
        streak_type: row.get(10)?,
    })
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        year: row.get(0)?,
        id: row.get(1)?,
        owner_id: row.get(2)?,
        abbreviation: row.get(3)?,
        location: row.get(4)?,
        nickname: row.get(5)?,
    })
}

fn owner_from_row(row: &Row<'_>) -> rusqlite::Result<Owner> {
    Ok(Owner {
        id: row.get(0)?,
        username: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
    })
}

/// League database handle.
///
/// Cheap to share behind an `Arc`; every call takes the connection lock
/// for its own duration only.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Store {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("Opened league store at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Store {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Create any missing tables.
    pub fn init_schema(&self) -> Result<(), StorageError> {
        self.lock()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Drop every table and recreate the schema.
    pub fn reset(&self) -> Result<(), StorageError> {
        info!("Dropping and recreating league tables");
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            DROP TABLE IF EXISTS matchups;
            DROP TABLE IF EXISTS records;
            DROP TABLE IF EXISTS teams;
            DROP TABLE IF EXISTS owners;
            DROP TABLE IF EXISTS champions;
            DROP TABLE IF EXISTS sackos;
            "#,
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Empty the tables populated from upstream. Sackos are curated by hand
    /// and survive a reload.
    pub fn truncate_league_tables(&self) -> Result<(), StorageError> {
        info!("Truncating league tables");
        self.lock()?.execute_batch(
            r#"
            DELETE FROM matchups;
            DELETE FROM records;
            DELETE FROM teams;
            DELETE FROM owners;
            DELETE FROM champions;
            "#,
        )?;
        Ok(())
    }

    pub fn counts(&self) -> Result<TableCounts, StorageError> {
        let conn = self.lock()?;
        let count = |table: &str| -> Result<usize, StorageError> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok(n as usize)
        };
        Ok(TableCounts {
            owners: count("owners")?,
            teams: count("teams")?,
            records: count("records")?,
            matchups: count("matchups")?,
            champions: count("champions")?,
            sackos: count("sackos")?,
        })
    }

    // ==================== Reads ====================

    /// Seasons with at least one matchup, newest first.
    pub fn distinct_years(&self) -> Result<Vec<i32>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT DISTINCT year FROM matchups ORDER BY year DESC")?;
        let years = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i32>, _>>()?;
        Ok(years)
    }

    /// All owners, ordered by name.
    pub fn owners(&self) -> Result<Vec<Owner>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, username, first_name, last_name FROM owners \
             ORDER BY first_name, last_name, id",
        )?;
        let owners = stmt
            .query_map([], owner_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(owners)
    }

    /// Teams for one season, or every season when `year` is `None`.
    pub fn teams(&self, year: Option<i32>) -> Result<Vec<Team>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT year, id, owner_id, abbreviation, location, nickname FROM teams \
             WHERE (?1 IS NULL OR year = ?1) ORDER BY year, id",
        )?;
        let teams = stmt
            .query_map(params![year], team_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(teams)
    }

    /// Upstream records for one season, or every season.
    pub fn records(&self, year: Option<i32>) -> Result<Vec<Record>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM records WHERE (?1 IS NULL OR year = ?1) ORDER BY year, team_id",
            RECORD_COLUMNS
        ))?;
        let records = stmt
            .query_map(params![year], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Matchup rows for one season (or all), ordered by week then team.
    pub fn matchups(&self, year: Option<i32>) -> Result<Vec<Matchup>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM matchups WHERE (?1 IS NULL OR year = ?1) \
             ORDER BY year, matchup_id, team_id",
            MATCHUP_COLUMNS
        ))?;
        let matchups = stmt
            .query_map(params![year], matchup_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(matchups)
    }

    /// Rows for a single week of a season, ordered by team.
    pub fn week_matchups(&self, year: i32, week: u32) -> Result<Vec<Matchup>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM matchups WHERE year = ?1 AND matchup_id = ?2 ORDER BY team_id",
            MATCHUP_COLUMNS
        ))?;
        let matchups = stmt
            .query_map(params![year, week], matchup_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(matchups)
    }

    /// Every decided game between two owners from `owner`'s side, newest
    /// season first and in week order within a season. Pending and
    /// consolation games are left out.
    pub fn matchup_history(
        &self,
        owner: &OwnerId,
        opponent: &OwnerId,
        match_type: MatchType,
    ) -> Result<Vec<Matchup>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM matchups \
             WHERE owner_id = ?1 AND opponent_owner_id = ?2 AND is_playoffs = ?3 \
               AND is_pending = 0 AND is_consolation = 0 \
             ORDER BY year DESC, matchup_id ASC",
            MATCHUP_COLUMNS
        ))?;
        let matchups = stmt
            .query_map(
                params![owner, opponent, match_type.is_playoffs()],
                matchup_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "Found {} {} games between {} and {}",
            matchups.len(),
            match_type,
            owner,
            opponent
        );
        Ok(matchups)
    }

    /// Decided games for one owner against any real opponent.
    pub fn owner_matchups(
        &self,
        owner: &OwnerId,
        match_type: MatchType,
    ) -> Result<Vec<Matchup>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM matchups \
             WHERE owner_id = ?1 AND is_playoffs = ?2 AND is_pending = 0 \
               AND is_consolation = 0 AND opponent_owner_id IS NOT NULL \
             ORDER BY year DESC, matchup_id ASC",
            MATCHUP_COLUMNS
        ))?;
        let matchups = stmt
            .query_map(params![owner, match_type.is_playoffs()], matchup_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(matchups)
    }

    /// Champions, newest first.
    pub fn champions(&self) -> Result<Vec<Champion>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT year, owner_id FROM champions ORDER BY year DESC")?;
        let champions = stmt
            .query_map([], |row| {
                Ok(Champion {
                    year: row.get(0)?,
                    owner_id: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(champions)
    }

    /// Sackos, newest first.
    pub fn sackos(&self) -> Result<Vec<Sacko>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT year, owner_id FROM sackos ORDER BY year DESC")?;
        let sackos = stmt
            .query_map([], |row| {
                Ok(Sacko {
                    year: row.get(0)?,
                    owner_id: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sackos)
    }

    // ==================== Upserts ====================

    /// Insert or fully replace matchup rows keyed by (year, matchup_id, team_id).
    pub fn upsert_matchups(&self, matchups: &[Matchup]) -> Result<usize, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO matchups ({}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14) \
                 ON CONFLICT(year, matchup_id, team_id) DO UPDATE SET \
                    owner_id = excluded.owner_id, \
                    opponent_team_id = excluded.opponent_team_id, \
                    opponent_owner_id = excluded.opponent_owner_id, \
                    team_score = excluded.team_score, \
                    opponent_team_score = excluded.opponent_team_score, \
                    is_win = excluded.is_win, \
                    is_loss = excluded.is_loss, \
                    is_pending = excluded.is_pending, \
                    is_bye = excluded.is_bye, \
                    is_playoffs = excluded.is_playoffs, \
                    is_consolation = excluded.is_consolation",
                MATCHUP_COLUMNS
            ))?;
            for m in matchups {
                stmt.execute(params![
                    m.year,
                    m.matchup_id,
                    m.team_id,
                    m.owner_id,
                    m.opponent_team_id,
                    m.opponent_owner_id,
                    m.team_score,
                    m.opponent_team_score,
                    m.is_win,
                    m.is_loss,
                    m.is_pending,
                    m.is_bye,
                    m.is_playoffs,
                    m.is_consolation,
                ])?;
            }
        }
        tx.commit()?;
        Ok(matchups.len())
    }

    /// Insert or fully replace records keyed by (year, team_id).
    pub fn upsert_records(&self, records: &[Record]) -> Result<usize, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO records ({}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) \
                 ON CONFLICT(year, team_id) DO UPDATE SET \
                    owner_id = excluded.owner_id, \
                    standing = excluded.standing, \
                    wins = excluded.wins, \
                    losses = excluded.losses, \
                    ties = excluded.ties, \
                    points_for = excluded.points_for, \
                    points_against = excluded.points_against, \
                    streak_length = excluded.streak_length, \
                    streak_type = excluded.streak_type",
                RECORD_COLUMNS
            ))?;
            for r in records {
                stmt.execute(params![
                    r.year,
                    r.team_id,
                    r.owner_id,
                    r.standing,
                    r.wins,
                    r.losses,
                    r.ties,
                    r.points_for,
                    r.points_against,
                    r.streak_length,
                    r.streak_type,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Insert or fully replace teams keyed by (year, id).
    pub fn upsert_teams(&self, teams: &[Team]) -> Result<usize, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO teams (year, id, owner_id, abbreviation, location, nickname) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(year, id) DO UPDATE SET \
                    owner_id = excluded.owner_id, \
                    abbreviation = excluded.abbreviation, \
                    location = excluded.location, \
                    nickname = excluded.nickname",
            )?;
            for t in teams {
                stmt.execute(params![
                    t.year,
                    t.id,
                    t.owner_id,
                    t.abbreviation,
                    t.location,
                    t.nickname
                ])?;
            }
        }
        tx.commit()?;
        Ok(teams.len())
    }

    /// Insert or fully replace owners keyed by id.
    pub fn upsert_owners(&self, owners: &[Owner]) -> Result<usize, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO owners (id, username, first_name, last_name) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(id) DO UPDATE SET \
                    username = excluded.username, \
                    first_name = excluded.first_name, \
                    last_name = excluded.last_name",
            )?;
            for o in owners {
                stmt.execute(params![o.id, o.username, o.first_name, o.last_name])?;
            }
        }
        tx.commit()?;
        Ok(owners.len())
    }

    /// Insert or replace champions keyed by year.
    pub fn upsert_champions(&self, champions: &[Champion]) -> Result<usize, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO champions (year, owner_id) VALUES (?1, ?2) \
                 ON CONFLICT(year) DO UPDATE SET owner_id = excluded.owner_id",
            )?;
            for c in champions {
                stmt.execute(params![c.year, c.owner_id])?;
            }
        }
        tx.commit()?;
        Ok(champions.len())
    }

    /// Record the Sacko for a year, replacing any previous designation.
    pub fn upsert_sacko(&self, sacko: &Sacko) -> Result<(), StorageError> {
        self.lock()?.execute(
            "INSERT INTO sackos (year, owner_id) VALUES (?1, ?2) \
             ON CONFLICT(year) DO UPDATE SET owner_id = excluded.owner_id",
            params![sacko.year, sacko.owner_id],
        )?;
        Ok(())
    }

    /// Remove the Sacko for a year. Returns whether a row was deleted.
    pub fn delete_sacko(&self, year: i32) -> Result<bool, StorageError> {
        let deleted = self
            .lock()?
            .execute("DELETE FROM sackos WHERE year = ?1", params![year])?;
        Ok(deleted > 0)
    }
}
