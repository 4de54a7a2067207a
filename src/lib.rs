//! Product Dashboard - product catalog management core
//!
//! Keeps an authoritative product list in sync with a remote catalog API and
//! derives a searchable, category-filtered view of it for presentation.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::application::Dashboard;
use crate::infrastructure::{ConfigManager, HttpCatalogClient, init_logging_with_config};

/// Load configuration, start logging and perform the initial catalog load
pub async fn run() -> Result<()> {
    let manager = ConfigManager::new().context("Failed to locate configuration")?;
    let config = manager.load().context("Failed to load configuration")?;
    init_logging_with_config(&config.logging)?;
    info!("Configuration file: {}", manager.config_path().display());

    info!("Catalog: {}", config.catalog.base_url);
    let client = HttpCatalogClient::new(config.catalog.clone())?;
    let mut dashboard = Dashboard::new(Arc::new(client));
    dashboard.start().await;

    let snapshot = dashboard.store().snapshot();
    if let Some(kind) = snapshot.last_error {
        warn!("{}", kind.user_message());
        return Ok(());
    }

    info!(
        "{} products in {} categories",
        snapshot.products.len(),
        snapshot.categories.len()
    );
    for category in dashboard.category_options().iter().skip(1) {
        let in_category = snapshot
            .products
            .iter()
            .filter(|p| &p.category == category)
            .count();
        info!("  {category}: {in_category}");
    }

    Ok(())
}
