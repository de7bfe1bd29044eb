use serde::Deserialize;

/// Main configuration structure for jobmeter
///
/// Every section falls back to its defaults, so an empty file is a valid
/// configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub kariyernet: KariyerNetConfig,
}

/// Proxy provider and pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Base URL of the proxy provider API
    #[serde(rename = "provider-url")]
    pub provider_url: String,

    /// Maximum number of proxies requested per refresh
    #[serde(rename = "max-size")]
    pub max_size: u32,

    /// Seconds between pool refreshes
    #[serde(rename = "refresh-interval")]
    pub refresh_interval: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            provider_url: "https://proxy.webshare.io".to_string(),
            max_size: 25,
            refresh_interval: 300,
        }
    }
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
        }
    }
}

/// Crawl pacing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Pause between result pages (milliseconds)
    #[serde(rename = "navigation-delay")]
    pub navigation_delay: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            navigation_delay: 5000,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "./jobmeter.db".to_string(),
        }
    }
}

/// Endpoints and search filters for kariyer.net
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KariyerNetConfig {
    /// Paged search endpoint (POST)
    #[serde(rename = "search-endpoint")]
    pub search_endpoint: String,

    /// Per-job detail endpoint (GET, `?jobId=`)
    #[serde(rename = "detail-endpoint")]
    pub detail_endpoint: String,

    /// Results per search page
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Department filter sent with every search
    pub departments: Vec<String>,

    /// Route requests through the proxy pool
    pub proxied: bool,
}

impl Default for KariyerNetConfig {
    fn default() -> Self {
        Self {
            search_endpoint: "https://api-web.kariyer.net/search".to_string(),
            detail_endpoint: "https://api-web.kariyer.net/job".to_string(),
            page_size: 50,
            departments: vec!["55".to_string(), "78".to_string()],
            proxied: false,
        }
    }
}
