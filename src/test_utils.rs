//! Test utilities for the product dashboard
//!
//! Provides an in-memory `CatalogClient` with switchable failures and
//! artificial latency, plus a small fixed catalog shared by the tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::catalog::{CatalogClient, CatalogError, CatalogResult};
use crate::domain::product::{Product, ProductDraft, ProductId, Rating};

/// Remote operations the mock can fail or delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    FetchAll,
    FetchCategories,
    Create,
    Update,
    Delete,
}

/// In-memory catalog; create, update and delete echo back without storing
pub struct MockCatalog {
    products: Vec<Product>,
    categories: Vec<String>,
    failing: Mutex<HashSet<MockOperation>>,
    delays: Mutex<HashMap<MockOperation, Duration>>,
    calls: Mutex<Vec<MockOperation>>,
    next_id: AtomicI64,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new(Vec::new(), &[])
    }
}

impl MockCatalog {
    pub fn new(products: Vec<Product>, categories: &[&str]) -> Self {
        Self {
            products,
            categories: categories.iter().map(ToString::to_string).collect(),
            failing: Mutex::new(HashSet::new()),
            delays: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(100),
        }
    }

    /// Make every later call of `operation` fail with a 503
    pub fn fail(&self, operation: MockOperation) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operation);
    }

    pub fn recover(&self, operation: MockOperation) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&operation);
    }

    /// Delay every later call of `operation`
    pub fn set_delay(&self, operation: MockOperation, delay: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operation, delay);
    }

    /// Id handed to the next created product
    pub fn set_next_id(&self, id: i64) {
        self.next_id.store(id, Ordering::SeqCst);
    }

    /// Operations called so far, in call order
    pub fn calls(&self) -> Vec<MockOperation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn enter(&self, operation: MockOperation) -> CatalogResult<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(operation);

        let delay = self
            .delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&operation)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&operation);
        if failing {
            return Err(CatalogError::Status {
                status: 503,
                url: format!("mock://{operation:?}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn fetch_all(&self) -> CatalogResult<Vec<Product>> {
        self.enter(MockOperation::FetchAll).await?;
        Ok(self.products.clone())
    }

    async fn fetch_categories(&self) -> CatalogResult<Vec<String>> {
        self.enter(MockOperation::FetchCategories).await?;
        Ok(self.categories.clone())
    }

    async fn create(&self, draft: &ProductDraft) -> CatalogResult<Product> {
        self.enter(MockOperation::Create).await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(Product::from_draft(ProductId::Int(id), draft.clone()))
    }

    async fn update(&self, id: &ProductId, draft: &ProductDraft) -> CatalogResult<Product> {
        self.enter(MockOperation::Update).await?;
        Ok(Product::from_draft(id.clone(), draft.clone()))
    }

    async fn delete(&self, _id: &ProductId) -> CatalogResult<()> {
        self.enter(MockOperation::Delete).await
    }
}

/// Red Shirt (id 1, clothing) and Blue Mug (id 2, home)
pub fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::Int(1),
            title: "Red Shirt".to_string(),
            price: 19.99,
            description: "Soft cotton".to_string(),
            category: "clothing".to_string(),
            image: "https://img.example.com/shirt.jpg".to_string(),
            rating: Rating {
                rate: 4.2,
                count: 31,
            },
        },
        Product {
            id: ProductId::Int(2),
            title: "Blue Mug".to_string(),
            price: 7.5,
            description: "Ceramic".to_string(),
            category: "home".to_string(),
            image: "https://img.example.com/mug.jpg".to_string(),
            rating: Rating {
                rate: 3.8,
                count: 12,
            },
        },
    ]
}

/// Valid draft with the given title and category
pub fn draft(title: &str, category: &str) -> ProductDraft {
    ProductDraft {
        title: title.to_string(),
        price: 12.0,
        description: "Sample item".to_string(),
        category: category.to_string(),
        image: String::new(),
        rating: Rating::default(),
    }
}
