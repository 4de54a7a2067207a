//! Search and category filtering over the product list
//!
//! The filtered view is always a pure projection of the product list under a
//! `FilterCriteria`; nothing here touches the network.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::domain::product::Product;

/// Category sentinel meaning "no category filter"
pub const ALL_CATEGORIES: &str = "all";

/// Category part of the filter criteria
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(name: String) -> Self {
        if name == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Only(name)
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::All => ALL_CATEGORIES.to_string(),
            CategoryFilter::Only(name) => name,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_CATEGORIES),
            Self::Only(name) => f.write_str(name),
        }
    }
}

/// Current search text and selected category
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FilterCriteria {
    pub search_term: String,
    #[ts(type = "string")]
    pub category: CategoryFilter,
}

impl FilterCriteria {
    pub fn new(search_term: impl Into<String>, category: impl Into<CategoryFilter>) -> Self {
        Self {
            search_term: search_term.into(),
            category: category.into(),
        }
    }

    /// True when neither a search term nor a category is active
    pub fn is_default(&self) -> bool {
        self.search_term.is_empty() && self.category == CategoryFilter::All
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.matches_search(product) && self.category.matches(&product.category)
    }

    fn matches_search(&self, product: &Product) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let needle = self.search_term.to_lowercase();
        product.title.to_lowercase().contains(&needle)
            || product.description.to_lowercase().contains(&needle)
    }
}

/// Products matching `criteria`, keeping their relative order in `products`
pub fn apply_filter(products: &[Product], criteria: &FilterCriteria) -> Vec<Product> {
    products
        .iter()
        .filter(|product| criteria.matches(product))
        .cloned()
        .collect()
}
