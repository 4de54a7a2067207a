//! Filter criteria holder
//!
//! Keeps the current search text and category. Every change is pushed to the
//! product store straight away; there is no debouncing.

use crate::application::product_store::ProductStore;
use crate::domain::filter::{CategoryFilter, FilterCriteria};

#[derive(Debug, Clone, Default)]
pub struct FilterCriteriaHolder {
    criteria: FilterCriteria,
}

impl FilterCriteriaHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holder starting from criteria that are already applied
    pub fn with_criteria(criteria: FilterCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_search_term(&mut self, store: &ProductStore, search_term: impl Into<String>) {
        self.criteria.search_term = search_term.into();
        self.apply(store);
    }

    pub fn set_category(&mut self, store: &ProductStore, category: impl Into<CategoryFilter>) {
        self.criteria.category = category.into();
        self.apply(store);
    }

    /// Replace both search text and category at once
    pub fn set(&mut self, store: &ProductStore, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.apply(store);
    }

    /// Reset to no search text and all categories
    pub fn clear(&mut self, store: &ProductStore) {
        self.criteria = FilterCriteria::default();
        self.apply(store);
    }

    fn apply(&self, store: &ProductStore) {
        store.apply_filter(self.criteria.clone());
    }
}
