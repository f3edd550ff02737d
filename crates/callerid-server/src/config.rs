//! Configuration for the directory server.

use anyhow::{Context, Result};
use callerid_directory::ContactDedup;
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Directory storage configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Directory behaviour
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the directory snapshot file
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Enable persistence (if false, the directory is in-memory only)
    #[serde(default = "default_true")]
    pub persist: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryConfig {
    /// Which existing entry turns an add-contact request into a no-op
    #[serde(default)]
    pub contact_dedup: ContactDedup,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global requests per minute
    #[serde(default = "default_global_rpm")]
    pub global_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            persist: true,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_per_minute: default_global_rpm(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8000
}

fn default_store_path() -> PathBuf {
    PathBuf::from("/data/directory.json")
}

fn default_true() -> bool {
    true
}

fn default_global_rpm() -> u32 {
    600
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nested keys use `__`, e.g. `STORE__PATH` or `DIRECTORY__CONTACT_DEDUP`.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_source(config::Environment::default().separator("__"))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
