use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::domain::filter::ALL_CATEGORIES;

/// Image shown for products that were created without one
pub const DEFAULT_IMAGE_URL: &str = "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg";

/// Upper bound of `Rating::rate`
pub const MAX_RATING: f64 = 5.0;

/// Catalog-assigned product identifier.
///
/// The remote catalog hands out integers, but ids are treated as opaque and
/// string ids are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum ProductId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// Customer rating summary
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rating {
    /// Average rate (0.0-5.0)
    pub rate: f64,
    /// Number of ratings
    pub count: u64,
}

/// Product as held by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Price in USD
    pub price: f64,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default = "default_image", deserialize_with = "deserialize_image")]
    pub image: String,
    #[serde(default)]
    pub rating: Rating,
}

impl Product {
    /// Build a product from an accepted draft and its assigned id
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Self {
            id,
            title: draft.title,
            price: draft.price,
            description: draft.description,
            category: draft.category,
            image: image_or_default(Some(&draft.image)),
            rating: draft.rating,
        }
    }

    /// Draft prefilled with this product's fields, used when editing
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            title: self.title.clone(),
            price: self.price,
            description: self.description.clone(),
            category: self.category.clone(),
            image: self.image.clone(),
            rating: self.rating,
        }
    }
}

/// Product payload without an identifier, sent for create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default)]
    pub rating: Rating,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DraftError {
    #[error("Product title must not be empty")]
    EmptyTitle,

    #[error("Product price must be a number greater than 0, got {0}")]
    InvalidPrice(f64),

    #[error("Product category must be a non-empty name other than 'all', got '{0}'")]
    InvalidCategory(String),

    #[error("Rating must be within 0-{max}, got {rate}", max = MAX_RATING)]
    InvalidRating { rate: f64 },
}

impl ProductDraft {
    /// Trim text fields and apply the default image when none is set
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            image: image_or_default(Some(&self.image)),
            ..self
        }
    }

    /// Check the invariants every catalog product must satisfy
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::EmptyTitle);
        }

        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(DraftError::InvalidPrice(self.price));
        }

        let category = self.category.trim();
        if category.is_empty() || category == ALL_CATEGORIES {
            return Err(DraftError::InvalidCategory(self.category.clone()));
        }

        if !(0.0..=MAX_RATING).contains(&self.rating.rate) {
            return Err(DraftError::InvalidRating {
                rate: self.rating.rate,
            });
        }

        Ok(())
    }
}

fn default_image() -> String {
    DEFAULT_IMAGE_URL.to_string()
}

fn image_or_default(image: Option<&str>) -> String {
    match image.map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => default_image(),
    }
}

fn deserialize_image<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(image_or_default(raw.as_deref()))
}
