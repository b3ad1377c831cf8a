//! Configuration loading from file and environment variables.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use turnout_db::DbRuntimeSettings;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Capacity controller settings.
    #[serde(default)]
    pub capacity: CapacityConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Default busy timeout for pooled connections, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Capacity controller configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CapacityConfig {
    /// How long accept/withdraw may wait for an event's lock, in milliseconds.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "turnout_capacity=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to emit logs as JSON.
    #[serde(default)]
    pub json: bool,
}

fn default_db_path() -> String {
    "turnout.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_lock_timeout_ms() -> u64 {
    3_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl DatabaseConfig {
    /// Pool settings derived from this section. Pool checkout shares the
    /// busy timeout.
    pub fn runtime_settings(&self) -> DbRuntimeSettings {
        DbRuntimeSettings {
            busy_timeout_ms: self.busy_timeout_ms,
            pool_max_size: self.pool_max_size,
            checkout_timeout_ms: self.busy_timeout_ms,
        }
    }
}

impl CapacityConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Parses configuration from TOML text. Missing keys take their defaults.
///
/// # Errors
///
/// Returns `ConfigError::Parse` if the text is not valid for [`Config`].
pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(contents)?)
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `TURNOUT_DB_PATH` overrides `database.path`
/// - `TURNOUT_DB_BUSY_TIMEOUT_MS` overrides `database.busy_timeout_ms`
/// - `TURNOUT_DB_POOL_MAX_SIZE` overrides `database.pool_max_size`
/// - `TURNOUT_LOCK_TIMEOUT_MS` overrides `capacity.lock_timeout_ms`
/// - `TURNOUT_LOG_LEVEL` overrides `logging.level`
/// - `TURNOUT_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => parse_config(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    if let Ok(db_path) = std::env::var("TURNOUT_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(ms) = env_parse("TURNOUT_DB_BUSY_TIMEOUT_MS") {
        config.database.busy_timeout_ms = ms;
    }
    if let Some(size) = env_parse("TURNOUT_DB_POOL_MAX_SIZE") {
        config.database.pool_max_size = size;
    }
    if let Some(ms) = env_parse("TURNOUT_LOCK_TIMEOUT_MS") {
        config.capacity.lock_timeout_ms = ms;
    }
    if let Ok(level) = std::env::var("TURNOUT_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("TURNOUT_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}
