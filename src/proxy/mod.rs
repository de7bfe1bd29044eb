//! Proxy pool management
//!
//! This module provides:
//! - Authenticated proxy endpoints built from provider records
//! - The provider interface and the Webshare implementation
//! - A refreshable, throttled pool that hands out endpoints at random

mod endpoint;
mod pool;
mod provider;

pub use endpoint::{ProviderRecord, ProxyEndpoint};
pub use pool::{ProxyPool, RefreshOutcome};
pub use provider::{ProxyProvider, WebshareProvider};

use crate::config::ProxyConfig;
use reqwest::Client;
use std::time::Duration;

/// Environment variable holding the proxy provider API key
pub const API_KEY_VAR: &str = "PROXY_PROVIDER_API_KEY";

/// Builds a Webshare-backed pool from configuration
///
/// # Arguments
///
/// * `config` - Proxy section of the configuration
/// * `client` - Direct (unproxied) HTTP client used to reach the provider
/// * `api_key` - Provider API key
pub fn build_pool(config: &ProxyConfig, client: Client, api_key: &str) -> ProxyPool {
    let provider = WebshareProvider::new(client, &config.provider_url, api_key);
    ProxyPool::new(
        provider,
        config.max_size,
        Duration::from_secs(config.refresh_interval),
    )
}
