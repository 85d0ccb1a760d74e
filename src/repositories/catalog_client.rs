use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument, Instrument};

use crate::models::{CatalogError, CatalogResult, Product, ProductId, StockEntry};
use crate::observability::Metrics;

/// Remote product catalog lookups
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch a product record by id
    async fn get_product(&self, product_id: ProductId) -> CatalogResult<Product>;
}

/// Remote stock lookups
#[async_trait]
pub trait StockService: Send + Sync {
    /// Fetch the available stock for a product id
    async fn get_stock(&self, product_id: ProductId) -> CatalogResult<StockEntry>;
}

/// JSON-over-HTTP client for the storefront catalog API
///
/// Serves `GET {base}/products/{id}` and `GET {base}/stock/{id}`.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
    metrics: Option<Arc<Metrics>>,
}

impl HttpCatalogClient {
    /// Create a new catalog client
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> CatalogResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            metrics: None,
        })
    }

    /// Record request counts and latencies into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[cfg(test)]
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn create_http_span(&self, endpoint: &str, url: &str) -> tracing::Span {
        tracing::info_span!(
            "catalog",
            "otel.kind" = "client",
            "otel.name" = format!("GET /{}", endpoint),
            "http.method" = "GET",
            "http.url" = %url,
            "http.status_code" = tracing::field::Empty,
            "peer.service" = "catalog",
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        resource: &str,
        product_id: ProductId,
    ) -> CatalogResult<T> {
        let url = format!("{}/{}/{}", self.base_url, endpoint, product_id);
        let span = self.create_http_span(endpoint, &url);
        let start = Instant::now();

        let result = self
            .fetch::<T>(&url, resource, product_id)
            .instrument(span)
            .await;

        if let Some(metrics) = &self.metrics {
            let status = match &result {
                Ok(_) => "success",
                Err(CatalogError::NotFound { .. }) => "not_found",
                Err(_) => "error",
            };
            metrics.record_catalog_request(endpoint, status, start.elapsed().as_secs_f64());
        }

        match &result {
            Ok(_) => debug!(endpoint, product_id, "Catalog lookup succeeded"),
            Err(e) => error!(endpoint, product_id, "Catalog lookup failed: {}", e),
        }

        result
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
        product_id: ProductId,
    ) -> CatalogResult<T> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::Span::current().record("http.status_code", status.as_u16());

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| CatalogError::Parse(format!("Failed to parse response: {}", e)));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                resource: resource.to_string(),
                id: product_id,
            });
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(CatalogError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CatalogService for HttpCatalogClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn get_product(&self, product_id: ProductId) -> CatalogResult<Product> {
        self.get_json("products", "product", product_id).await
    }
}

#[async_trait]
impl StockService for HttpCatalogClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn get_stock(&self, product_id: ProductId) -> CatalogResult<StockEntry> {
        self.get_json("stock", "stock", product_id).await
    }
}
