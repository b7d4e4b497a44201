//! Service configuration
//!
//! Layered as built-in defaults, then an optional TOML file, then
//! `AIR_QUALITY__*` environment variables (`__` separates sections).

use ::config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// File looked up by [`AppConfig::load`], extension optional
pub const DEFAULT_CONFIG_FILE: &str = "config/air-quality";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upstream: UpstreamConfig,
    pub defaults: QueryDefaults,
    /// Max tracing level (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            upstream: UpstreamConfig::default(),
            defaults: QueryDefaults::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Listening socket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// SQLite database location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "air_quality.db".to_string(),
        }
    }
}

/// Upstream air-quality API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: fetcher::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Values used when a request omits a parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDefaults {
    /// Paris
    pub latitude: f64,
    pub longitude: f64,
    /// Rows returned by the daily read endpoint
    pub daily_limit: usize,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            latitude: 48.8566,
            longitude: 2.3522,
            daily_limit: 5,
        }
    }
}

impl AppConfig {
    /// Load from [`DEFAULT_CONFIG_FILE`] and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from the given file (missing is fine) and the environment
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        ::config::Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("AIR_QUALITY").separator("__"))
            .build()?
            .try_deserialize()
    }
}
