//! jobmeter: an incremental job-posting harvester
//!
//! This crate walks the paginated search API of a job board newest-first,
//! fetches the detail of every posting it has not seen before and stops as
//! soon as it catches up with earlier harvests. Outbound traffic can be routed
//! through a rotating pool of authenticated proxies.

pub mod config;
pub mod crawler;
pub mod http;
pub mod job;
pub mod proxy;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for jobmeter operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Proxy error: {0}")]
    Proxy(#[from] ProxyError),

    #[error("Unable to determine page count from {url}: {reason}")]
    PageCount { url: String, reason: String },

    #[error("Failed to normalize job {id}: {message}")]
    Normalize { id: String, message: String },

    #[error("Unknown website: {0}")]
    UnknownSource(String),

    #[error("Invalid crawl transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Proxy endpoint and provider errors
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Proxy record is missing field `{0}`")]
    MissingField(&'static str),

    #[error("Invalid proxy port: {0}")]
    InvalidPort(String),

    #[error("Invalid proxy address: {0}")]
    InvalidAddress(String),

    #[error("Proxy provider returned HTTP {0}")]
    ProviderStatus(u16),

    #[error("Proxy provider request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Result type alias for jobmeter operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{JobScraper, PagedCrawler};
pub use http::{FetchResult, ResilientClient};
pub use job::JobRecord;
pub use proxy::{ProxyEndpoint, ProxyPool};
