//! Configuration for orgusers
//!
//! Two layers live here:
//! - [`Lookup`]: process-wide constants (connection option suffix, collection
//!   and field names, default timeout). These never change at runtime.
//! - [`Config`]: ambient settings loaded from an optional TOML file.
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Fixed lookup settings shared by every run.
pub struct Lookup;

impl Lookup {
    /// Scheme prepended to a URL that does not already carry it.
    pub const SCHEME_PREFIX: &'static str = "mongodb://";

    /// Query options appended to every connection URL.
    pub const CONNECTION_OPTIONS: &'static str =
        "?tls=true&replicaSet=rs0&readPreference=secondaryPreferred&retryWrites=false";

    pub const ORGANIZATIONS: &'static str = "organizations";
    pub const USERS: &'static str = "users";

    /// Organization field matched against the requested path.
    pub const ORG_PATH_FIELD: &'static str = "path";

    /// Embedded membership field matched against the organization id.
    pub const MEMBERSHIP_ORG_FIELD: &'static str = "organizations.orgId";

    /// Budget for connect + resolve + fetch.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

    /// Prefix of the driver `appName`.
    pub const APP_NAME: &'static str = "orgusers";
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Connection-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Pipeline timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Colorize JSON written to a terminal
    #[serde(default = "default_color")]
    pub color: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn default_timeout() -> u64 {
    Lookup::DEFAULT_TIMEOUT_SECS
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

fn default_color() -> bool {
    true
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
        }
    }
}

impl Config {
    /// Default configuration file path (`~/.orgusers/config.toml`)
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".orgusers")
            .join("config.toml")
    }

    /// Load configuration from a file
    ///
    /// An explicitly given path must exist. Without one, the default path is
    /// read when present and defaults are used otherwise.
    ///
    /// # Arguments
    /// * `path` - Optional explicit path to a TOML file
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) if !p.exists() => {
                return Err(ConfigError::FileNotFound(p.display().to_string()).into());
            }
            Some(p) => p.to_path_buf(),
            None => {
                let default = Self::default_config_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            ConfigError::InvalidFormat(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.connection.timeout == 0 {
            return Err(ConfigError::InvalidValue {
                field: "connection.timeout".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Get pipeline timeout as Duration
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection.timeout)
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
