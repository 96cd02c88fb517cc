//! Configuration for redislock.
//!
//! A single TOML file describes where the key store lives and how long locks
//! last:
//!
//! ```toml
//! [store]
//! endpoint = "redis://127.0.0.1:6379"
//! password_env = "REDISLOCK_PASSWORD"
//! tls = false
//! pool_size = 4
//!
//! [lock]
//! expiration_ms = 10000
//! drift_ms = 2000
//! ```
//!
//! Every field is optional and falls back to the defaults in
//! [`crate::constants`]. The password itself never appears in the file; only
//! the name of the environment variable holding it does.
//!
//! # File Location
//!
//! - `REDISLOCK_CONFIG` if set
//! - Unix/macOS: `~/.redislock/config.toml`
//! - Windows: `%LOCALAPPDATA%\redislock\config.toml`
//!
//! A missing file is not an error and yields the defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::{CONFIG_PATH_ENV, DEFAULT_DRIFT, DEFAULT_EXPIRATION, DEFAULT_POOL_SIZE};
use crate::core::ConfigError;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Connection settings for the key store.
    #[serde(default)]
    pub store: StoreConfig,

    /// Lock timing settings.
    #[serde(default)]
    pub lock: LockConfig,
}

/// Where and how to reach the Redis-compatible store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Connection string, e.g. `redis://127.0.0.1:6379` or `rediss://cache:6380`.
    pub endpoint: String,

    /// Name of the environment variable holding the store password.
    pub password_env: Option<String>,

    /// Connect over TLS.
    pub tls: bool,

    /// Number of pooled connections.
    pub pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "redis://127.0.0.1:6379".to_string(),
            password_env: None,
            tls: false,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

/// Lock timings, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LockConfig {
    /// TTL written to the store for each acquisition.
    pub expiration_ms: u64,

    /// Allowance for network latency and clock drift.
    pub drift_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            expiration_ms: DEFAULT_EXPIRATION.as_millis() as u64,
            drift_ms: DEFAULT_DRIFT.as_millis() as u64,
        }
    }
}

impl LockConfig {
    /// Lock TTL as a [`Duration`].
    pub const fn expiration(&self) -> Duration {
        Duration::from_millis(self.expiration_ms)
    }

    /// Drift allowance as a [`Duration`].
    pub const fn drift(&self) -> Duration {
        Duration::from_millis(self.drift_ms)
    }
}

impl Config {
    /// Load from the default location, or defaults if no file exists.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, otherwise from [`Config::default_path`].
    ///
    /// A missing file yields [`Config::default`].
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load and validate a configuration file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Default config file path.
    ///
    /// `$REDISLOCK_CONFIG` wins when set. Otherwise the file lives in
    /// `~/.redislock/` on Unix and macOS and in the local data directory on
    /// Windows.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory (or, on Windows, the local data
    /// directory) cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("redislock")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".redislock")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Check values that would make the lock unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock.expiration_ms == 0 {
            return Err(ConfigError::ZeroExpiration);
        }
        if self.lock.drift_ms == 0 {
            return Err(ConfigError::ZeroDrift);
        }
        if self.store.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        if self.store.pool_size == 0 {
            return Err(ConfigError::ZeroPoolSize);
        }
        Ok(())
    }
}
