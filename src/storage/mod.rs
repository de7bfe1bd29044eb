//! Storage module for persisting harvested jobs
//!
//! This module handles all database operations for the harvester, including:
//! - SQLite database initialization and schema management
//! - Job record persistence with per-source de-duplication
//! - Run tracking
//! - JSON export of the full store

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{JobStore, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a job store
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}

/// Writes every stored record to `path` as a pretty-printed JSON array
///
/// Returns the number of records written.
pub fn export_json(store: &dyn JobStore, path: &Path) -> StorageResult<usize> {
    let records = store.export_records()?;
    let json = serde_json::to_string_pretty(&records)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    std::fs::write(path, json)?;

    tracing::info!("Exported {} jobs to {}", records.len(), path.display());
    Ok(records.len())
}

/// Represents a harvest run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub website: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    /// Records added by the run, once completed
    pub new_jobs: Option<u64>,
    pub error_message: Option<String>,
}

/// Status of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
