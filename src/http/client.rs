//! HTTP execution with optional proxy routing
//!
//! This module handles all outbound requests of a harvest, including:
//! - Building HTTP clients with timeouts and the configured user agent
//! - Routing flagged requests through an endpoint from the proxy pool
//! - Falling back to a direct connection when no endpoint is available
//! - Classifying transport failures and error statuses

use crate::config::HttpConfig;
use crate::proxy::{ProxyEndpoint, ProxyPool};
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;

/// Result of a single request
#[derive(Debug)]
pub enum FetchResult {
    /// A response was received
    ///
    /// For unproxied requests this includes non-2xx statuses.
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Response body
        body: String,
    },

    /// A proxied request came back with a 4xx or 5xx status
    HttpError {
        url: String,
        status_code: u16,
        /// Endpoint the request went through, if any
        proxy: Option<String>,
    },

    /// Transport failure (DNS, connection refused, timeout, broken body)
    NetworkError {
        url: String,
        error: String,
        proxy: Option<String>,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Consumes the result, returning the body of a successful response
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Success { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Short description of a failure, for logs and error messages
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { status_code, .. } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error, .. } => Some(error.clone()),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - Timeouts and user agent
/// * `proxy` - Endpoint to route http and https traffic through
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client (e.g. unparseable proxy URL)
pub fn build_http_client(
    config: &HttpConfig,
    proxy: Option<&ProxyEndpoint>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true);

    if let Some(endpoint) = proxy {
        builder = builder.proxy(endpoint.to_reqwest_proxy()?);
    }

    builder.build()
}

/// HTTP client that can send individual requests through the proxy pool
///
/// A request is attempted once; retrying is up to the caller.
pub struct ResilientClient {
    config: HttpConfig,
    direct: Client,
    pool: Option<Arc<ProxyPool>>,
}

impl ResilientClient {
    /// Creates a client
    ///
    /// # Arguments
    ///
    /// * `config` - Timeouts and user agent
    /// * `pool` - Proxy pool for flagged requests; `None` sends everything direct
    pub fn new(config: &HttpConfig, pool: Option<Arc<ProxyPool>>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            config: config.clone(),
            direct: build_http_client(config, None)?,
            pool,
        })
    }

    /// Sends a GET request
    pub async fn get(&self, url: &str, use_proxy: bool) -> FetchResult {
        self.execute(url, use_proxy, |client| client.get(url)).await
    }

    /// Sends a POST request with a JSON body
    ///
    /// Headers are sent exactly as given; no content type is added.
    pub async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
        headers: &HeaderMap,
        use_proxy: bool,
    ) -> FetchResult {
        let payload = body.to_string();
        self.execute(url, use_proxy, |client| {
            client.post(url).headers(headers.clone()).body(payload)
        })
        .await
    }

    async fn execute<F>(&self, url: &str, use_proxy: bool, build: F) -> FetchResult
    where
        F: FnOnce(&Client) -> RequestBuilder + Send,
    {
        let endpoint = match (&self.pool, use_proxy) {
            (Some(pool), true) => pool.acquire().await,
            _ => None,
        };

        let proxied = match &endpoint {
            Some(ep) => match build_http_client(&self.config, Some(ep)) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!("Cannot use proxy {} ({}), going direct", ep, e);
                    None
                }
            },
            None => {
                if use_proxy {
                    tracing::debug!("No proxy available for {}, going direct", url);
                }
                None
            }
        };

        let proxy_label = proxied
            .as_ref()
            .and(endpoint.as_ref())
            .map(|ep| ep.to_string());
        let client = proxied.as_ref().unwrap_or(&self.direct);

        let response = match build(client).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = classify_error(&e);
                log_failure(url, proxy_label.as_deref(), &error);
                return FetchResult::NetworkError {
                    url: url.to_string(),
                    error,
                    proxy: proxy_label,
                };
            }
        };

        let status = response.status();
        if use_proxy && (status.is_client_error() || status.is_server_error()) {
            log_failure(url, proxy_label.as_deref(), &format!("HTTP {}", status));
            return FetchResult::HttpError {
                url: url.to_string(),
                status_code: status.as_u16(),
                proxy: proxy_label,
            };
        }

        let final_url = response.url().to_string();
        match response.text().await {
            Ok(body) => FetchResult::Success {
                final_url,
                status_code: status.as_u16(),
                body,
            },
            Err(e) => {
                let error = classify_error(&e);
                log_failure(url, proxy_label.as_deref(), &error);
                FetchResult::NetworkError {
                    url: url.to_string(),
                    error,
                    proxy: proxy_label,
                }
            }
        }
    }
}

fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}

fn log_failure(url: &str, proxy: Option<&str>, error: &str) {
    match proxy {
        Some(proxy) => tracing::error!("Request to {} failed using proxy {}: {}", url, proxy, error),
        None => tracing::error!("Request to {} failed: {}", url, error),
    }
}
