use axum::{
    extract::State,
    http::{header, StatusCode},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::observability::Metrics;
use crate::services::CartStore;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// State for the metrics endpoint
#[derive(Clone)]
pub struct MetricsState {
    pub metrics: Arc<Metrics>,
    pub cart_store: Arc<CartStore>,
}

/// Create the router serving `GET /metrics`
pub fn create_metrics_router(metrics: Arc<Metrics>, cart_store: Arc<CartStore>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(MetricsState {
            metrics,
            cart_store,
        })
}

/// Prometheus scrape endpoint.
///
/// Cart size gauges are sampled from the store on every scrape.
#[instrument(name = "metrics_handler", skip(state))]
pub async fn metrics_handler(
    State(state): State<MetricsState>,
) -> Result<([(header::HeaderName, &'static str); 1], String), (StatusCode, &'static str)> {
    let cart = state.cart_store.cart();
    state.metrics.observe_cart(&cart);
    debug!(products = cart.len(), "Sampled cart for scrape");

    let body = state.metrics.encode().map_err(|e| {
        error!(error = %e, "Failed to encode metrics");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics")
    })?;

    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body))
}
