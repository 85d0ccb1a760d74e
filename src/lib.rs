pub mod config;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::{Config, ConfigError};
pub use observability::{init_observability, shutdown_observability, Metrics};
pub use services::CartStore;

use handlers::{create_cart_router, create_metrics_router, health_check};
use observability::{observability_middleware, CartOperationTracer};

/// Build the HTTP application serving `cart_store`
pub fn create_app(metrics: Arc<Metrics>, cart_store: Arc<CartStore>) -> Router {
    let metrics_for_middleware = metrics.clone();
    let tracer = CartOperationTracer::new(metrics.clone());

    Router::new()
        .route("/health/status", get(health_check))
        .merge(create_metrics_router(metrics, cart_store.clone()))
        .merge(create_cart_router(cart_store, tracer))
        // Outermost layer last
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
        .layer(TraceLayer::new_for_http())
}
