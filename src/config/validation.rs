use crate::config::types::{
    Config, CrawlerConfig, HttpConfig, KariyerNetConfig, ProxyConfig, StorageConfig,
};
use crate::ConfigError;
use url::Url;

/// Lowest navigation delay accepted from a configuration file (milliseconds)
pub const MIN_NAVIGATION_DELAY_MS: u64 = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_proxy_config(&config.proxy)?;
    validate_http_config(&config.http)?;
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    validate_kariyernet_config(&config.kariyernet)?;
    Ok(())
}

/// Validates proxy pool configuration
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    validate_http_url("provider-url", &config.provider_url)?;

    if config.max_size < 1 || config.max_size > 100 {
        return Err(ConfigError::Validation(format!(
            "max-size must be between 1 and 100, got {}",
            config.max_size
        )));
    }

    if config.refresh_interval < 1 {
        return Err(ConfigError::Validation(
            "refresh-interval must be at least 1 second".to_string(),
        ));
    }

    Ok(())
}

/// Validates outbound HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be between 1 and timeout-secs ({}), got {}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl pacing
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.navigation_delay < MIN_NAVIGATION_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "navigation-delay must be >= {}ms, got {}ms",
            MIN_NAVIGATION_DELAY_MS, config.navigation_delay
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the kariyer.net source section
fn validate_kariyernet_config(config: &KariyerNetConfig) -> Result<(), ConfigError> {
    validate_http_url("search-endpoint", &config.search_endpoint)?;
    validate_http_url("detail-endpoint", &config.detail_endpoint)?;

    if config.page_size < 1 || config.page_size > 200 {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and 200, got {}",
            config.page_size
        )));
    }

    if config.departments.iter().any(|d| d.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "departments cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a value parses as an http(s) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", field, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field,
            url.scheme()
        )));
    }

    Ok(())
}
