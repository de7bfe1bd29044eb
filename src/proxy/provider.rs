//! Proxy list providers

use crate::proxy::ProviderRecord;
use crate::ProxyError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Source of candidate proxy endpoints
#[async_trait]
pub trait ProxyProvider: Send + Sync {
    /// Fetches up to `max_size` candidate records
    ///
    /// Records are returned unfiltered; validity and completeness are checked
    /// by the pool.
    async fn fetch(&self, max_size: u32) -> Result<Vec<ProviderRecord>, ProxyError>;
}

#[derive(Debug, Deserialize)]
struct ProxyListResponse {
    #[serde(default)]
    results: Vec<ProviderRecord>,
}

/// Webshare proxy list API (`/api/v2/proxy/list/`)
pub struct WebshareProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WebshareProvider {
    /// Creates a provider client
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for provider calls (never proxied)
    /// * `base_url` - Provider root, e.g. `https://proxy.webshare.io`
    /// * `api_key` - Token sent in the `Authorization` header
    pub fn new(client: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn list_url(&self) -> String {
        format!("{}/api/v2/proxy/list/", self.base_url)
    }
}

#[async_trait]
impl ProxyProvider for WebshareProvider {
    async fn fetch(&self, max_size: u32) -> Result<Vec<ProviderRecord>, ProxyError> {
        let response = self
            .client
            .get(self.list_url())
            .query(&[
                ("mode", "direct".to_string()),
                ("page", "1".to_string()),
                ("page_size", max_size.to_string()),
            ])
            .header("Authorization", format!("Token {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::ProviderStatus(status.as_u16()));
        }

        let list: ProxyListResponse = response.json().await?;
        tracing::debug!("Proxy provider returned {} records", list.results.len());

        Ok(list.results)
    }
}
