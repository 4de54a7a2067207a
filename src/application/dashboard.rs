//! Dashboard composition root
//!
//! Owns the product store and the filter criteria holder and tracks which
//! product, if any, is being edited. Presentation components receive the
//! dashboard (or its store) explicitly; there is no global instance.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::filter_criteria::FilterCriteriaHolder;
use crate::application::product_store::ProductStore;
use crate::domain::catalog::CatalogClient;
use crate::domain::filter::{CategoryFilter, FilterCriteria};
use crate::domain::product::{Product, ProductDraft, ProductId};

pub struct Dashboard {
    store: Arc<ProductStore>,
    filters: FilterCriteriaHolder,
    editing: Option<Product>,
}

impl Dashboard {
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self::with_store(Arc::new(ProductStore::new(client)))
    }

    pub fn with_store(store: Arc<ProductStore>) -> Self {
        Self {
            store,
            filters: FilterCriteriaHolder::new(),
            editing: None,
        }
    }

    pub fn store(&self) -> &Arc<ProductStore> {
        &self.store
    }

    pub fn criteria(&self) -> &FilterCriteria {
        self.filters.criteria()
    }

    /// Product currently selected for editing
    pub fn editing(&self) -> Option<&Product> {
        self.editing.as_ref()
    }

    /// Load the catalog and adopt the store's criteria afterwards.
    ///
    /// A successful load resets them to the defaults; a failed one keeps the
    /// criteria that were active before.
    pub async fn start(&mut self) {
        info!("🚀 Loading product catalog");
        self.store.load().await;
        self.filters = FilterCriteriaHolder::with_criteria(self.store.criteria());
    }

    /// Select a product for editing and return a draft prefilled from it
    pub fn begin_edit(&mut self, id: &ProductId) -> Option<ProductDraft> {
        let product = self.store.find(id)?;
        let draft = product.to_draft();
        debug!("Editing product {}", id);
        self.editing = Some(product);
        Some(draft)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Update the product being edited, or create a new one when none is
    pub async fn submit(&mut self, draft: ProductDraft) -> bool {
        match self.editing.as_ref().map(|p| p.id.clone()) {
            Some(id) => {
                let updated = self.store.update(&id, draft).await;
                if updated {
                    self.editing = None;
                }
                updated
            }
            None => self.store.create(draft).await,
        }
    }

    /// Delete a product once `confirm` agrees; declining never reaches the catalog
    pub async fn delete<F>(&mut self, id: &ProductId, confirm: F) -> bool
    where
        F: FnOnce(&ProductId) -> bool,
    {
        if !confirm(id) {
            debug!("Deletion of product {} not confirmed", id);
            return false;
        }

        let deleted = self.store.delete(id).await;
        if deleted && self.editing.as_ref().is_some_and(|p| &p.id == id) {
            self.editing = None;
        }
        deleted
    }

    pub fn search(&mut self, search_term: impl Into<String>) {
        self.filters.set_search_term(&self.store, search_term);
    }

    pub fn select_category(&mut self, category: impl Into<CategoryFilter>) {
        self.filters.set_category(&self.store, category);
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear(&self.store);
    }

    pub fn dismiss_error(&self) {
        self.store.clear_error();
    }

    /// Category picker entries: `all` followed by the catalog's categories
    pub fn category_options(&self) -> Vec<String> {
        self.store.category_options()
    }
}
