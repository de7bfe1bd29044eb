//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the JobStore trait.

use crate::job::JobRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{JobStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

const RUN_COLUMNS: &str =
    "id, website, started_at, finished_at, config_hash, status, new_jobs, error_message";

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn read_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn read_job(row: &Row<'_>) -> rusqlite::Result<JobRecord> {
    Ok(JobRecord {
        source: row.get(0)?,
        external_id: row.get(1)?,
        title: row.get(2)?,
        company: row.get(3)?,
        date_posted: read_date(row, 4)?,
        closing_date: read_date(row, 5)?,
        location: row.get(6)?,
        salary: row.get(7)?,
        details: row.get(8)?,
        language: row.get(9)?,
    })
}

fn read_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        website: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
        new_jobs: row.get::<_, Option<i64>>(6)?.map(|n| n as u64),
        error_message: row.get(7)?,
    })
}

impl JobStore for SqliteStore {
    // ===== Records =====

    fn add_record(&mut self, record: &JobRecord) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO jobs
             (source, external_id, title, company, date_posted, closing_date,
              location, salary, details, language, harvested_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.source,
                record.external_id,
                record.title,
                record.company,
                record.date_posted.format(DATE_FORMAT).to_string(),
                record.closing_date.format(DATE_FORMAT).to_string(),
                record.location,
                record.salary,
                record.details,
                record.language,
                now
            ],
        )?;

        if inserted == 0 {
            tracing::debug!(
                "Job {}/{} already stored",
                record.source,
                record.external_id
            );
        }

        Ok(inserted > 0)
    }

    fn recent_ids(&self, source: &str) -> StorageResult<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT external_id FROM jobs WHERE source = ?1")?;

        let ids = stmt
            .query_map(params![source], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(ids)
    }

    fn size(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn export_records(&self) -> StorageResult<Vec<JobRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT source, external_id, title, company, date_posted, closing_date,
                    location, salary, details, language
             FROM jobs ORDER BY date_posted DESC, id ASC",
        )?;

        let records = stmt
            .query_map([], read_job)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    // ===== Run Management =====

    fn create_run(&mut self, website: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (website, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![website, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], read_run)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        let run = self.conn.query_row(&sql, [], read_run).optional()?;
        Ok(run)
    }

    fn complete_run(&mut self, run_id: i64, new_jobs: u64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, new_jobs = ?3 WHERE id = ?4",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                new_jobs as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64, message: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, error_message = ?3 WHERE id = ?4",
            params![RunStatus::Failed.to_db_string(), now, message, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }
}
