//! Logging system configuration and initialization
//!
//! This module provides the logging setup with:
//! - Console output with compact formatting
//! - Optional file output through a non-blocking appender
//! - Structured JSON file logs (optional)
//! - Level and per-module filters from configuration, overridable by `RUST_LOG`

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::info;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

// Global guard to keep the log file writer alive
lazy_static::lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(Vec::new());
}

/// UTC timestamps with millisecond precision
struct UtcMillisFormatter;

impl FormatTime for UtcMillisFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))
    }
}

/// Get the log directory relative to the executable location
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(std::path::Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level plus module directives
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level: {}", config.level))?;

    // Keep our own crate at the requested level even if a module filter is broader
    let mut directives: Vec<String> = config
        .module_filters
        .iter()
        .map(|(module, level)| format!("{module}={level}"))
        .collect();
    directives.sort();
    directives.push(format!("product_dashboard_lib={}", config.level));

    for directive in directives {
        let parsed = directive
            .parse()
            .with_context(|| format!("Invalid log directive: {directive}"))?;
        filter = filter.add_directive(parsed);
    }

    Ok(filter)
}

/// Initialize logging with custom configuration
///
/// Returns an error instead of panicking when a global subscriber is already set.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_env_filter(config)?;

    let console_layer = config.console_output.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stdout)
            .with_timer(UtcMillisFormatter)
            .with_target(false)
    });

    let file_layer = if config.file_output {
        let log_dir = config.log_dir.clone().unwrap_or_else(get_log_directory);
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        let (file_writer, file_guard) = non_blocking(rolling::daily(&log_dir, &config.file_name));
        LOG_GUARDS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(file_guard);

        let layer = if config.json_format {
            fmt::Layer::new()
                .json()
                .with_writer(file_writer)
                .with_timer(UtcMillisFormatter)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .boxed()
        } else {
            fmt::Layer::new()
                .with_writer(file_writer)
                .with_timer(UtcMillisFormatter)
                .with_target(false)
                .with_ansi(false)
                .boxed()
        };
        Some((layer, log_dir))
    } else {
        None
    };

    if console_layer.is_none() && file_layer.is_none() {
        return Err(anyhow!("No logging output configured"));
    }

    let (file_layer, log_dir) = match file_layer {
        Some((layer, dir)) => (Some(layer), Some(dir)),
        None => (None, None),
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Logging system already initialized")?;

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if let Some(dir) = log_dir {
        info!("Log directory: {:?}", dir);
        info!("JSON format: {}", config.json_format);
    }

    Ok(())
}
