use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable that forces kariyer.net traffic through the proxy pool
const KARIYERNET_PROXIED_VAR: &str = "KARIYERNET_PROXIED";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: Config = toml::from_str(&content)?;
    apply_env_overrides(&mut config);

    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is stored with every harvest run so runs made under different
/// settings can be told apart.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Applies process environment overrides on top of file values
pub fn apply_env_overrides(config: &mut Config) {
    if let Ok(value) = std::env::var(KARIYERNET_PROXIED_VAR) {
        config.kariyernet.proxied = parse_flag(&value);
        tracing::debug!(
            "{} set, kariyernet proxied = {}",
            KARIYERNET_PROXIED_VAR,
            config.kariyernet.proxied
        );
    }
}

/// Interprets a boolean-ish environment value
///
/// Empty strings and the usual "off" spellings are false; anything else is true.
pub fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}
