//! Configuration loading, validation, and management for Warband.
//!
//! Loads configuration from `~/.warband/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use warband_core::MAX_SEASON_WEEK;

/// Storage backends `[store].backend` accepts.
pub const KNOWN_BACKENDS: [&str; 3] = ["file", "sqlite", "memory"];

/// The root configuration structure.
///
/// Maps directly to `~/.warband/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where roster data lives (defaults to `~/.warband/data`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Storage configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Season configuration
    #[serde(default)]
    pub season: SeasonConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_backend")]
    pub backend: String,

    #[serde(default = "default_file_name")]
    pub file_name: String,

    #[serde(default = "default_sqlite_file")]
    pub sqlite_file: String,
}

fn default_store_backend() -> String {
    "file".into()
}
fn default_file_name() -> String {
    "roster.json".into()
}
fn default_sqlite_file() -> String {
    "roster.db".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            file_name: default_file_name(),
            sqlite_file: default_sqlite_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Origin allowed by CORS (defaults to the gateway's own address)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_origin: Option<String>,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cors_origin: None,
        }
    }
}

impl GatewayConfig {
    /// The CORS origin to allow: the configured one, or the gateway's own
    /// address.
    pub fn allowed_origin(&self) -> String {
        self.cors_origin
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonConfig {
    /// Week a fresh roster starts in.
    #[serde(default)]
    pub default_week: u8,
}

impl AppConfig {
    /// Load configuration from the default path (~/.warband/config.toml).
    ///
    /// Environment variables override the file:
    /// - `WARBAND_DATA_DIR`
    /// - `WARBAND_PORT`
    /// - `WARBAND_STORE`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("WARBAND_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(port) = lookup("WARBAND_PORT") {
            self.gateway.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("WARBAND_PORT is not a valid port: {port}"))
            })?;
        }

        if let Some(backend) = lookup("WARBAND_STORE") {
            self.store.backend = backend.trim().to_lowercase();
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".warband")
    }

    /// Directory holding roster data.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("data"))
    }

    /// Path of the JSON roster file.
    pub fn roster_file(&self) -> PathBuf {
        self.data_dir().join(&self.store.file_name)
    }

    /// Path of the SQLite database.
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir().join(&self.store.sqlite_file)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !KNOWN_BACKENDS.contains(&self.store.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "store.backend must be one of {}, got '{}'",
                KNOWN_BACKENDS.join(", "),
                self.store.backend
            )));
        }

        if self.gateway.port == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.port must be non-zero".into(),
            ));
        }

        if self.season.default_week > MAX_SEASON_WEEK {
            return Err(ConfigError::ValidationError(format!(
                "season.default_week must be between 0 and {MAX_SEASON_WEEK}"
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            store: StoreConfig::default(),
            gateway: GatewayConfig::default(),
            season: SeasonConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
