//! HTTP client for the remote product catalog
//!
//! JSON over a fixed base URL with a request timeout and client-side rate
//! limiting. Failures are logged here and returned as `CatalogError`.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, direct::NotKeyed},
};
use reqwest::{
    Client, RequestBuilder, Response,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::domain::catalog::{CatalogClient, CatalogError, CatalogResult};
use crate::domain::product::{Product, ProductDraft, ProductId, Rating};
use crate::infrastructure::config::{CatalogConfig, IdAssignment};

/// Product body as returned by create/update; missing fields fall back to the draft
#[derive(Debug, Deserialize)]
struct ProductPayload {
    id: Option<ProductId>,
    title: Option<String>,
    price: Option<f64>,
    description: Option<String>,
    category: Option<String>,
    image: Option<String>,
    rating: Option<Rating>,
}

impl ProductPayload {
    fn into_product(self, id: ProductId, draft: &ProductDraft) -> Product {
        let merged = ProductDraft {
            title: self.title.unwrap_or_else(|| draft.title.clone()),
            price: self.price.unwrap_or(draft.price),
            description: self.description.unwrap_or_else(|| draft.description.clone()),
            category: self.category.unwrap_or_else(|| draft.category.clone()),
            image: self.image.unwrap_or_else(|| draft.image.clone()),
            rating: self.rating.unwrap_or(draft.rating),
        };
        Product::from_draft(id, merged)
    }
}

/// reqwest-backed `CatalogClient`
pub struct HttpCatalogClient {
    client: Client,
    base_url: Url,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    config: CatalogConfig,
    last_issued_id: AtomicI64,
}

impl HttpCatalogClient {
    /// Create a new catalog client with the given configuration
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid catalog base URL: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Catalog base URL cannot be a base: {}", config.base_url);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .context("Rate limit must be greater than 0")?,
        );

        Ok(Self {
            client,
            base_url,
            rate_limiter: RateLimiter::direct(quota),
            config,
            last_issued_id: AtomicI64::new(0),
        })
    }

    /// Fetch the products of a single category
    pub async fn fetch_by_category(&self, category: &str) -> CatalogResult<Vec<Product>> {
        let url = self.endpoint(&["products", "category", category])?;
        self.get_json(url).await
    }

    /// Base URL with `segments` appended as percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> CatalogResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request with rate limiting and status checking
    async fn send(&self, request: RequestBuilder, url: &Url) -> CatalogResult<Response> {
        self.rate_limiter.until_ready().await;

        tracing::debug!("Catalog request: {}", url);

        let response = request.send().await.map_err(|source| {
            tracing::error!("Catalog request to {} failed: {}", url, source);
            CatalogError::Request {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Catalog responded with {} for {}", status, url);
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        tracing::debug!("Catalog response: {} ({})", url, status);
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &Url) -> CatalogResult<T> {
        let body = response.bytes().await.map_err(|source| CatalogError::Request {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!("Malformed catalog response from {}: {}", url, e);
            CatalogError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            }
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> CatalogResult<T> {
        let response = self.send(self.client.get(url.clone()), &url).await?;
        Self::decode(response, &url).await
    }

    /// Strictly increasing millisecond timestamp id
    fn next_client_id(&self) -> ProductId {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_issued_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        ProductId::Int(now.max(previous + 1))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_all(&self) -> CatalogResult<Vec<Product>> {
        let url = self.endpoint(&["products"])?;
        let products: Vec<Product> = self.get_json(url).await?;
        tracing::info!("Fetched {} products from catalog", products.len());
        Ok(products)
    }

    async fn fetch_categories(&self) -> CatalogResult<Vec<String>> {
        let url = self.endpoint(&["products", "categories"])?;
        self.get_json(url).await
    }

    async fn create(&self, draft: &ProductDraft) -> CatalogResult<Product> {
        let url = self.endpoint(&["products"])?;
        let response = self.send(self.client.post(url.clone()).json(draft), &url).await?;

        let product = match self.config.id_assignment {
            IdAssignment::ClientTimestamp => Product::from_draft(self.next_client_id(), draft.clone()),
            IdAssignment::Server => {
                let payload: ProductPayload = Self::decode(response, &url).await?;
                let id = payload.id.clone().ok_or_else(|| CatalogError::Decode {
                    url: url.to_string(),
                    message: "create response has no id".to_string(),
                })?;
                payload.into_product(id, draft)
            }
        };

        tracing::info!("Created product {} ({})", product.id, product.title);
        Ok(product)
    }

    async fn update(&self, id: &ProductId, draft: &ProductDraft) -> CatalogResult<Product> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        let response = self.send(self.client.put(url.clone()).json(draft), &url).await?;
        let payload: ProductPayload = Self::decode(response, &url).await?;

        tracing::info!("Updated product {}", id);
        Ok(payload.into_product(id.clone(), draft))
    }

    async fn delete(&self, id: &ProductId) -> CatalogResult<()> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        self.send(self.client.delete(url.clone()), &url).await?;

        tracing::info!("Deleted product {}", id);
        Ok(())
    }
}
