//! Product store
//!
//! Holds the authoritative product list and the filtered view derived from it.
//! Mutations go through the remote catalog first; local state is only touched
//! once the remote call has succeeded, under a single write lock, so readers
//! never observe a half-applied change.
//!
//! The lock is never held across an await point. Two operations in flight at
//! the same time each reconcile against whatever the list looks like when
//! their response arrives; the last one to complete wins.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use ts_rs::TS;

use crate::application::errors::ErrorKind;
use crate::application::events::StoreEvent;
use crate::domain::catalog::CatalogClient;
use crate::domain::filter::{ALL_CATEGORIES, FilterCriteria, apply_filter};
use crate::domain::product::{Product, ProductDraft, ProductId};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Read-only copy of the store state handed to presentation
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct StoreSnapshot {
    pub products: Vec<Product>,
    pub filtered: Vec<Product>,
    pub categories: Vec<String>,
    pub criteria: FilterCriteria,
    pub loading: bool,
    pub last_error: Option<ErrorKind>,
}

#[derive(Debug, Default)]
struct StoreState {
    products: Vec<Product>,
    filtered: Vec<Product>,
    categories: Vec<String>,
    criteria: FilterCriteria,
    loads_in_flight: usize,
    load_completed: bool,
    last_error: Option<ErrorKind>,
}

impl StoreState {
    fn refilter(&mut self) {
        self.filtered = apply_filter(&self.products, &self.criteria);
    }

    /// Loading until the first load settles, and while any load is in flight
    fn is_loading(&self) -> bool {
        self.loads_in_flight > 0 || !self.load_completed
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Marks a load in flight; dropping it (completion, error or cancellation) settles it
struct LoadGuard<'a> {
    state: &'a RwLock<StoreState>,
}

impl<'a> LoadGuard<'a> {
    fn enter(state: &'a RwLock<StoreState>) -> Self {
        state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .loads_in_flight += 1;
        Self { state }
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
        state.load_completed = true;
    }
}

pub struct ProductStore {
    client: Arc<dyn CatalogClient>,
    state: RwLock<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl ProductStore {
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            client,
            state: RwLock::new(StoreState::default()),
            events,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: StoreEvent) {
        debug!("Store event: {}", event.event_name());
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn record_error(&self, kind: ErrorKind) {
        self.write().last_error = Some(kind);
        self.emit(StoreEvent::ErrorRaised { kind });
    }

    /// Subscribe to state-change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Fetch products and categories concurrently and replace the local list.
    ///
    /// A category failure is logged only. A product failure records
    /// `FetchFailed` and leaves the list as it was.
    pub async fn load(&self) {
        let guard = LoadGuard::enter(&self.state);
        self.emit(StoreEvent::LoadStarted);

        let (products, categories) =
            tokio::join!(self.client.fetch_all(), self.client.fetch_categories());

        let outcome = {
            let mut state = self.write();

            match categories {
                Ok(categories) => state.categories = categories,
                Err(e) => warn!("Error fetching categories: {}", e),
            }

            match products {
                Ok(products) => {
                    state.criteria = FilterCriteria::default();
                    state.filtered.clone_from(&products);
                    state.products = products;
                    state.last_error = None;
                    Ok((count(state.products.len()), count(state.categories.len())))
                }
                Err(e) => {
                    error!("Error fetching products: {}", e);
                    state.last_error = Some(ErrorKind::FetchFailed);
                    Err(ErrorKind::FetchFailed)
                }
            }
        };
        drop(guard);

        match outcome {
            Ok((product_count, category_count)) => {
                info!("✅ Loaded {} products in {} categories", product_count, category_count);
                self.emit(StoreEvent::Loaded {
                    product_count,
                    category_count,
                });
            }
            Err(kind) => self.emit(StoreEvent::ErrorRaised { kind }),
        }
    }

    /// Create a product remotely and append it to the list.
    ///
    /// The filtered view is recomputed under the current criteria, so a new
    /// product that does not match them stays out of it.
    pub async fn create(&self, draft: ProductDraft) -> bool {
        let draft = draft.normalized();
        if let Err(e) = draft.validate() {
            warn!("Rejected product draft: {}", e);
            self.record_error(ErrorKind::CreateFailed);
            return false;
        }

        let product = match self.client.create(&draft).await {
            Ok(product) => product,
            Err(e) => {
                error!("Error adding product: {}", e);
                self.record_error(ErrorKind::CreateFailed);
                return false;
            }
        };

        let appended = {
            let mut state = self.write();
            if state.products.iter().any(|p| p.id == product.id) {
                false
            } else {
                state.products.push(product.clone());
                state.refilter();
                true
            }
        };

        if !appended {
            error!("Catalog returned duplicate product id {}", product.id);
            self.record_error(ErrorKind::CreateFailed);
            return false;
        }

        self.emit(StoreEvent::ProductCreated { product });
        true
    }

    /// Update a product remotely and replace the first local entry with its id.
    ///
    /// An id with no local entry leaves the list as it is.
    pub async fn update(&self, id: &ProductId, draft: ProductDraft) -> bool {
        let draft = draft.normalized();
        if let Err(e) = draft.validate() {
            warn!("Rejected product draft for {}: {}", id, e);
            self.record_error(ErrorKind::UpdateFailed);
            return false;
        }

        let product = match self.client.update(id, &draft).await {
            Ok(product) => product,
            Err(e) => {
                error!("Error updating product {}: {}", id, e);
                self.record_error(ErrorKind::UpdateFailed);
                return false;
            }
        };

        let replaced = {
            let mut state = self.write();
            match state.products.iter().position(|p| &p.id == id) {
                Some(index) => {
                    state.products[index] = product.clone();
                    state.refilter();
                    true
                }
                None => false,
            }
        };

        if replaced {
            self.emit(StoreEvent::ProductUpdated { product });
        } else {
            debug!("Updated product {} is not in the local list", id);
        }
        true
    }

    /// Delete a product remotely and remove the first local entry with its id.
    ///
    /// Callers are expected to have confirmed the deletion with the user.
    pub async fn delete(&self, id: &ProductId) -> bool {
        if let Err(e) = self.client.delete(id).await {
            error!("Error deleting product {}: {}", id, e);
            self.record_error(ErrorKind::DeleteFailed);
            return false;
        }

        let removed = {
            let mut state = self.write();
            match state.products.iter().position(|p| &p.id == id) {
                Some(index) => {
                    state.products.remove(index);
                    state.refilter();
                    true
                }
                None => false,
            }
        };

        if removed {
            self.emit(StoreEvent::ProductDeleted { id: id.clone() });
        } else {
            debug!("Deleted product {} is not in the local list", id);
        }
        true
    }

    /// Recompute the filtered view under `criteria` and remember them
    pub fn apply_filter(&self, criteria: FilterCriteria) {
        let match_count = {
            let mut state = self.write();
            state.criteria = criteria.clone();
            state.refilter();
            count(state.filtered.len())
        };
        self.emit(StoreEvent::FilterApplied {
            criteria,
            match_count,
        });
    }

    /// Dismiss the recorded error
    pub fn clear_error(&self) {
        let had_error = self.write().last_error.take().is_some();
        if had_error {
            self.emit(StoreEvent::ErrorCleared);
        }
    }

    pub fn products(&self) -> Vec<Product> {
        self.read().products.clone()
    }

    pub fn filtered(&self) -> Vec<Product> {
        self.read().filtered.clone()
    }

    pub fn categories(&self) -> Vec<String> {
        self.read().categories.clone()
    }

    /// Categories for a category picker, led by the `all` sentinel
    pub fn category_options(&self) -> Vec<String> {
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(self.read().categories.iter().cloned())
            .collect()
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.read().criteria.clone()
    }

    pub fn find(&self, id: &ProductId) -> Option<Product> {
        self.read().products.iter().find(|p| &p.id == id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.read().is_loading()
    }

    pub fn last_error(&self) -> Option<ErrorKind> {
        self.read().last_error
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.read();
        StoreSnapshot {
            products: state.products.clone(),
            filtered: state.filtered.clone(),
            categories: state.categories.clone(),
            criteria: state.criteria.clone(),
            loading: state.is_loading(),
            last_error: state.last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::DEFAULT_IMAGE_URL;
    use crate::test_utils::{MockCatalog, MockOperation, draft, sample_products};
    use std::time::Duration;

    fn ids(products: &[Product]) -> Vec<ProductId> {
        products.iter().map(|p| p.id.clone()).collect()
    }

    async fn loaded_store() -> (Arc<MockCatalog>, ProductStore) {
        let catalog = Arc::new(MockCatalog::new(sample_products(), &["clothing", "home"]));
        let store = ProductStore::new(catalog.clone());
        store.load().await;
        (catalog, store)
    }

    #[tokio::test]
    async fn test_new_store_is_loading_and_empty() {
        let store = ProductStore::new(Arc::new(MockCatalog::default()));
        assert!(store.is_loading());
        assert!(store.products().is_empty());
        assert_eq!(store.last_error(), None);
    }

    #[tokio::test]
    async fn test_load_populates_products_and_categories() {
        let (_, store) = loaded_store().await;

        assert!(!store.is_loading());
        assert_eq!(store.products().len(), 2);
        assert_eq!(store.filtered(), store.products());
        assert_eq!(store.categories(), vec!["clothing", "home"]);
        assert_eq!(store.category_options(), vec!["all", "clothing", "home"]);
        assert_eq!(store.last_error(), None);
    }

    #[tokio::test]
    async fn test_load_failure_records_fetch_failed() {
        let catalog = Arc::new(MockCatalog::new(sample_products(), &["clothing"]));
        catalog.fail(MockOperation::FetchAll);
        let store = ProductStore::new(catalog);

        store.load().await;

        assert!(!store.is_loading());
        assert!(store.products().is_empty());
        assert!(store.filtered().is_empty());
        assert_eq!(store.last_error(), Some(ErrorKind::FetchFailed));
        assert_eq!(store.categories(), vec!["clothing"]);
    }

    #[tokio::test]
    async fn test_category_failure_does_not_block_products() {
        let catalog = Arc::new(MockCatalog::new(sample_products(), &["clothing"]));
        catalog.fail(MockOperation::FetchCategories);
        let store = ProductStore::new(catalog);

        store.load().await;

        assert_eq!(store.products().len(), 2);
        assert!(store.categories().is_empty());
        assert_eq!(store.last_error(), None);
    }

    #[tokio::test]
    async fn test_successful_reload_clears_error_and_criteria() {
        let catalog = Arc::new(MockCatalog::new(sample_products(), &[]));
        catalog.fail(MockOperation::FetchAll);
        let store = ProductStore::new(catalog.clone());
        store.load().await;
        assert_eq!(store.last_error(), Some(ErrorKind::FetchFailed));

        catalog.recover(MockOperation::FetchAll);
        store.apply_filter(FilterCriteria::new("red", "all"));
        store.load().await;

        assert_eq!(store.last_error(), None);
        assert!(store.criteria().is_default());
        assert_eq!(store.filtered().len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_load_still_clears_loading() {
        let catalog = Arc::new(MockCatalog::new(sample_products(), &[]));
        catalog.set_delay(MockOperation::FetchAll, Duration::from_millis(500));
        let store = ProductStore::new(catalog);

        let result = tokio::time::timeout(Duration::from_millis(20), store.load()).await;

        assert!(result.is_err());
        assert!(!store.is_loading());
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_filter_scenario_then_delete() {
        let (_, store) = loaded_store().await;

        store.apply_filter(FilterCriteria::new("red", "all"));
        assert_eq!(ids(&store.filtered()), vec![ProductId::Int(1)]);

        store.apply_filter(FilterCriteria::new("", "home"));
        assert_eq!(ids(&store.filtered()), vec![ProductId::Int(2)]);

        assert!(store.delete(&ProductId::Int(2)).await);
        assert_eq!(ids(&store.products()), vec![ProductId::Int(1)]);
        assert!(store.filtered().is_empty());
    }

    #[tokio::test]
    async fn test_apply_filter_twice_is_stable() {
        let (_, store) = loaded_store().await;
        let criteria = FilterCriteria::new("mug", "all");

        store.apply_filter(criteria.clone());
        let once = store.filtered();
        store.apply_filter(criteria);
        assert_eq!(store.filtered(), once);
    }

    #[tokio::test]
    async fn test_create_appends_and_respects_active_filter() {
        let (_, store) = loaded_store().await;
        store.apply_filter(FilterCriteria::new("", "home"));

        assert!(store.create(draft("Green Hat", "clothing")).await);

        let products = store.products();
        assert_eq!(products.len(), 3);
        assert_eq!(products[2].title, "Green Hat");
        assert_eq!(products[2].image, DEFAULT_IMAGE_URL);
        assert_eq!(ids(&store.filtered()), vec![ProductId::Int(2)]);
    }

    #[tokio::test]
    async fn test_consecutive_creates_keep_both_in_view() {
        let (_, store) = loaded_store().await;

        assert!(store.create(draft("Green Hat", "clothing")).await);
        assert!(store.create(draft("Yellow Scarf", "clothing")).await);

        assert_eq!(store.products().len(), 4);
        assert_eq!(store.filtered(), store.products());
    }

    #[tokio::test]
    async fn test_create_failure_leaves_state_unchanged() {
        let (catalog, store) = loaded_store().await;
        catalog.fail(MockOperation::Create);
        let before = store.snapshot();

        assert!(!store.create(draft("Green Hat", "clothing")).await);

        assert_eq!(store.products(), before.products);
        assert_eq!(store.filtered(), before.filtered);
        assert_eq!(store.last_error(), Some(ErrorKind::CreateFailed));
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_catalog() {
        let (catalog, store) = loaded_store().await;
        let invalid = ProductDraft {
            price: 0.0,
            ..draft("Free Lunch", "home")
        };

        assert!(!store.create(invalid).await);

        assert_eq!(store.last_error(), Some(ErrorKind::CreateFailed));
        assert!(!catalog.calls().contains(&MockOperation::Create));
        assert_eq!(store.products().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_id_from_catalog_is_rejected() {
        let (catalog, store) = loaded_store().await;
        catalog.set_next_id(1);

        assert!(!store.create(draft("Impostor", "home")).await);

        assert_eq!(store.products().len(), 2);
        assert_eq!(store.last_error(), Some(ErrorKind::CreateFailed));
    }

    #[tokio::test]
    async fn test_update_replaces_matching_entry() {
        let (_, store) = loaded_store().await;
        store.apply_filter(FilterCriteria::new("shirt", "all"));

        assert!(store.update(&ProductId::Int(1), draft("Red Sweater", "clothing")).await);

        let products = store.products();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, ProductId::Int(1));
        assert_eq!(products[0].title, "Red Sweater");
        assert!(store.filtered().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_a_no_op() {
        let (_, store) = loaded_store().await;
        let before = store.products();

        assert!(store.update(&ProductId::Int(99), draft("Ghost", "home")).await);
        assert_eq!(store.products(), before);
    }

    #[tokio::test]
    async fn test_update_failure_leaves_state_unchanged() {
        let (catalog, store) = loaded_store().await;
        catalog.fail(MockOperation::Update);
        store.apply_filter(FilterCriteria::new("shirt", "all"));
        let before = store.snapshot();

        assert!(!store.update(&ProductId::Int(1), draft("Red Sweater", "clothing")).await);

        assert_eq!(store.products(), before.products);
        assert_eq!(store.filtered(), before.filtered);
        assert_eq!(store.last_error(), Some(ErrorKind::UpdateFailed));
    }

    #[tokio::test]
    async fn test_invalid_update_draft_never_reaches_catalog() {
        let (catalog, store) = loaded_store().await;
        let before = store.snapshot();
        let invalid = ProductDraft {
            title: "   ".to_string(),
            ..draft("Red Sweater", "clothing")
        };

        assert!(!store.update(&ProductId::Int(1), invalid).await);

        assert_eq!(store.last_error(), Some(ErrorKind::UpdateFailed));
        assert!(!catalog.calls().contains(&MockOperation::Update));
        assert_eq!(store.products(), before.products);
        assert_eq!(store.filtered(), before.filtered);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_keeps_length() {
        let (_, store) = loaded_store().await;
        assert!(store.delete(&ProductId::Int(99)).await);
        assert_eq!(store.products().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_failure_records_error() {
        let (catalog, store) = loaded_store().await;
        catalog.fail(MockOperation::Delete);
        store.apply_filter(FilterCriteria::new("", "clothing"));
        let before = store.snapshot();

        assert!(!store.delete(&ProductId::Int(1)).await);
        assert_eq!(store.products(), before.products);
        assert_eq!(store.filtered(), before.filtered);
        assert_eq!(store.last_error(), Some(ErrorKind::DeleteFailed));

        store.clear_error();
        assert_eq!(store.last_error(), None);
    }

    #[tokio::test]
    async fn test_update_completing_after_delete_does_not_resurrect() {
        let (catalog, store) = loaded_store().await;
        catalog.set_delay(MockOperation::Update, Duration::from_millis(50));

        let (updated, deleted) = tokio::join!(
            store.update(&ProductId::Int(2), draft("Blue Mug XL", "home")),
            store.delete(&ProductId::Int(2)),
        );

        assert!(updated && deleted);
        assert_eq!(ids(&store.products()), vec![ProductId::Int(1)]);
    }

    #[tokio::test]
    async fn test_concurrent_creates_both_land() {
        let (_, store) = loaded_store().await;

        let (a, b) = tokio::join!(
            store.create(draft("Green Hat", "clothing")),
            store.create(draft("Teapot", "home")),
        );

        assert!(a && b);
        assert_eq!(store.products().len(), 4);
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let catalog = Arc::new(MockCatalog::new(sample_products(), &["home"]));
        let store = ProductStore::new(catalog);
        let mut events = store.subscribe();

        store.load().await;
        store.apply_filter(FilterCriteria::new("", "home"));

        assert_eq!(events.recv().await.unwrap(), StoreEvent::LoadStarted);
        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent::Loaded {
                product_count: 2,
                category_count: 1
            }
        );
        assert!(matches!(
            events.recv().await.unwrap(),
            StoreEvent::FilterApplied { match_count: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_snapshot_serializes() {
        let (_, store) = loaded_store().await;
        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json["loading"], false);
        assert_eq!(json["criteria"]["category"], "all");
        assert_eq!(json["products"].as_array().unwrap().len(), 2);
    }
}
