//! Infrastructure layer for the remote catalog, configuration and logging

pub mod catalog_client;
pub mod config;
pub mod logging;

// Re-export commonly used items
pub use catalog_client::HttpCatalogClient;
pub use config::{AppConfig, CatalogConfig, ConfigError, ConfigManager, IdAssignment, LoggingConfig};
pub use logging::{get_log_directory, init_logging_with_config};
