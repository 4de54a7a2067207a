//! Domain module - product entities, filtering and the remote catalog seam
//!
//! Everything here is independent of the HTTP transport and of the store's
//! state management.

pub mod catalog;
pub mod filter;
pub mod product;

// Re-export commonly used items for convenience
pub use catalog::{CatalogClient, CatalogError, CatalogResult};
pub use filter::{ALL_CATEGORIES, CategoryFilter, FilterCriteria, apply_filter};
pub use product::{DEFAULT_IMAGE_URL, DraftError, Product, ProductDraft, ProductId, Rating};
