//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::job::JobRecord;
use crate::storage::RunRecord;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for job store implementations
///
/// The crawler only reads the set of known identifiers before a run; every
/// write happens after the crawl returns.
pub trait JobStore {
    // ===== Records =====

    /// Stores a harvested record
    ///
    /// # Returns
    ///
    /// `true` if the record was inserted, `false` if `(source, external_id)`
    /// was already stored
    fn add_record(&mut self, record: &JobRecord) -> StorageResult<bool>;

    /// Gets every stored identifier for a source
    fn recent_ids(&self, source: &str) -> StorageResult<HashSet<String>>;

    /// Counts stored records across all sources
    fn size(&self) -> StorageResult<u64>;

    /// Loads all records, newest posting first
    fn export_records(&self) -> StorageResult<Vec<JobRecord>>;

    // ===== Run Management =====

    /// Creates a new harvest run
    ///
    /// # Arguments
    ///
    /// * `website` - Source being harvested
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, website: &str, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run as completed with the number of records it added
    fn complete_run(&mut self, run_id: i64, new_jobs: u64) -> StorageResult<()>;

    /// Marks a run as failed
    fn fail_run(&mut self, run_id: i64, message: &str) -> StorageResult<()>;
}
