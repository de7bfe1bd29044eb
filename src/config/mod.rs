//! Configuration module for jobmeter
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use jobmeter::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("jobmeter.toml")).unwrap();
//! println!("Proxy pool size: {}", config.proxy.max_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, HttpConfig, KariyerNetConfig, ProxyConfig, StorageConfig,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash, parse_flag,
};
pub use validation::{validate, MIN_NAVIGATION_DELAY_MS};
