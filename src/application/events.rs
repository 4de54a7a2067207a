//! State-change notifications for presentation
//!
//! The product store broadcasts one event after each settled change so that
//! subscribers can re-render from a fresh snapshot.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::application::errors::ErrorKind;
use crate::domain::filter::FilterCriteria;
use crate::domain::product::{Product, ProductId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type")]
#[ts(export)]
pub enum StoreEvent {
    LoadStarted,
    Loaded {
        product_count: u32,
        category_count: u32,
    },
    ProductCreated {
        product: Product,
    },
    ProductUpdated {
        product: Product,
    },
    ProductDeleted {
        id: ProductId,
    },
    FilterApplied {
        criteria: FilterCriteria,
        match_count: u32,
    },
    ErrorRaised {
        kind: ErrorKind,
    },
    ErrorCleared,
}

impl StoreEvent {
    /// Get the event name for logging and frontend dispatch
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::LoadStarted => "load-started",
            Self::Loaded { .. } => "loaded",
            Self::ProductCreated { .. } => "product-created",
            Self::ProductUpdated { .. } => "product-updated",
            Self::ProductDeleted { .. } => "product-deleted",
            Self::FilterApplied { .. } => "filter-applied",
            Self::ErrorRaised { .. } => "error-raised",
            Self::ErrorCleared => "error-cleared",
        }
    }
}
