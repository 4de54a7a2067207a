//! Remote catalog interface
//!
//! The product store only talks to the remote catalog through this trait;
//! the HTTP implementation lives in the infrastructure layer.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::product::{Product, ProductDraft, ProductId};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Catalog responded with status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode catalog response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl CatalogError {
    /// True when the request never produced a response (network, timeout)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request { .. })
    }

    /// True for a 404 from the catalog
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch every product in the catalog
    async fn fetch_all(&self) -> CatalogResult<Vec<Product>>;

    /// Fetch the category names known to the catalog
    async fn fetch_categories(&self) -> CatalogResult<Vec<String>>;

    /// Create a product; the returned product carries its assigned id
    async fn create(&self, draft: &ProductDraft) -> CatalogResult<Product>;

    /// Replace the product `id` with `draft`
    async fn update(&self, id: &ProductId, draft: &ProductDraft) -> CatalogResult<Product>;

    async fn delete(&self, id: &ProductId) -> CatalogResult<()>;
}
