//! Configuration infrastructure
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional TOML/JSON file, then `PRODUCT_DASHBOARD__*` environment variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Default values used when neither the config file nor the environment set a key
pub mod defaults {
    pub const CATALOG_BASE_URL: &str = "https://fakestoreapi.com";
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;
    pub const USER_AGENT: &str = concat!("product-dashboard/", env!("CARGO_PKG_VERSION"));
    pub const MAX_REQUESTS_PER_SECOND: u32 = 10;

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = false;
    pub const LOG_FILE_NAME: &str = "product-dashboard.log";
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },

    #[error("Could not determine the user configuration directory")]
    ConfigDirUnavailable,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

/// How a newly created product gets its id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdAssignment {
    /// Id is a client-side millisecond timestamp; the create response is ignored
    #[default]
    ClientTimestamp,
    /// Id is taken from the catalog's create response
    Server,
}

/// Remote catalog connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the product catalog API
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    pub user_agent: String,

    /// Client-side request rate limit
    pub max_requests_per_second: u32,

    pub id_assignment: IdAssignment,
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::CATALOG_BASE_URL.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            id_assignment: IdAssignment::default(),
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,

    pub file_name: String,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            module_filters: HashMap::from([
                ("reqwest".to_string(), "info".to_string()),
                ("hyper".to_string(), "warn".to_string()),
                ("h2".to_string(), "warn".to_string()),
                ("tokio".to_string(), "info".to_string()),
            ]),
        }
    }
}

impl AppConfig {
    /// Check values that would otherwise fail later at client or logger setup
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = url::Url::parse(&self.catalog.base_url) {
            return Err(ConfigError::Validation {
                message: format!("catalog.base_url '{}' is not a valid URL: {e}", self.catalog.base_url),
            });
        }

        if self.catalog.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                message: "catalog.timeout_seconds must be greater than 0".to_string(),
            });
        }

        if self.catalog.max_requests_per_second == 0 {
            return Err(ConfigError::Validation {
                message: "catalog.max_requests_per_second must be greater than 0".to_string(),
            });
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation {
                message: format!("logging.level '{}' is not one of {LOG_LEVELS:?}", self.logging.level),
            });
        }

        if !self.logging.console_output && !self.logging.file_output {
            return Err(ConfigError::Validation {
                message: "at least one of logging.console_output and logging.file_output must be enabled"
                    .to_string(),
            });
        }

        Ok(())
    }
}

/// Locates and loads the application configuration
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub const ENV_PREFIX: &'static str = "PRODUCT_DASHBOARD";

    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("product-dashboard"))
            .ok_or(ConfigError::ConfigDirUnavailable)
    }

    /// Manager for `<config dir>/product-dashboard/config.toml`
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self::with_path(Self::get_config_dir()?.join("config.toml")))
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration; a missing file yields the defaults
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if self.config_path.exists() {
            info!("Loading configuration from: {:?}", self.config_path);
        } else {
            info!("Configuration file not found, using defaults: {:?}", self.config_path);
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(self.config_path.as_path()).required(false))
            .add_source(
                config::Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.catalog.timeout(), Duration::from_secs(10));
        assert_eq!(config.catalog.id_assignment, IdAssignment::ClientTimestamp);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("absent.toml"));

        assert_eq!(manager.config_path(), dir.path().join("absent.toml"));
        let config = manager.load().unwrap();
        assert_eq!(config.catalog.base_url, defaults::CATALOG_BASE_URL);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let file = write_config(
            r#"
            [catalog]
            base_url = "http://localhost:9000"
            timeout_seconds = 3
            id_assignment = "server"

            [logging]
            level = "debug"
            "#,
        );

        let config = ConfigManager::with_path(file.path()).load().unwrap();
        assert_eq!(config.catalog.base_url, "http://localhost:9000");
        assert_eq!(config.catalog.timeout_seconds, 3);
        assert_eq!(config.catalog.id_assignment, IdAssignment::Server);
        assert_eq!(config.catalog.max_requests_per_second, defaults::MAX_REQUESTS_PER_SECOND);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.console_output);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let file = write_config("[catalog]\ntimeout_seconds = 0\n");

        let err = ConfigManager::with_path(file.path()).load().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = AppConfig {
            catalog: CatalogConfig {
                base_url: "not a url".to_string(),
                ..CatalogConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_needs_an_output() {
        let mut config = AppConfig::default();
        config.logging.console_output = false;
        config.logging.file_output = false;
        assert!(config.validate().is_err());
    }
}
