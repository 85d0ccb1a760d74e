use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use shoecart_rs::{
    create_app, init_observability,
    repositories::{FileStorage, HttpCatalogClient, StorageCartRepository},
    services::TracingNotificationSink,
    shutdown_observability, CartStore, Config, Metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first (basic logging only)
    let config = Config::from_env().context("Failed to load configuration")?;
    println!("Configuration loaded successfully");

    // RUST_LOG, when set, wins over the configured level
    if std::env::var_os("RUST_LOG").is_none() {
        let level = &config.observability.log_level;
        std::env::set_var(
            "RUST_LOG",
            format!("shoecart_rs={},tower_http={}", level, level),
        );
    }

    init_observability(
        &config.observability.service_name,
        &config.observability.service_version,
        config.observability.otlp_endpoint.as_deref(),
        config.observability.enable_json_logging,
    )?;

    info!(
        "Starting {} v{}",
        config.observability.service_name, config.observability.service_version
    );
    info!(
        "Catalog: {}, storage: {}",
        config.catalog.catalog_url,
        config.storage.storage_path.display()
    );

    let metrics = Arc::new(Metrics::new()?);
    info!("Metrics initialized successfully");

    let storage = Arc::new(
        FileStorage::open(&config.storage.storage_path)
            .context("Failed to open cart storage")?,
    );
    let repository = Arc::new(StorageCartRepository::new(
        storage,
        config.storage.cart_storage_key.clone(),
    ));

    let catalog = Arc::new(
        HttpCatalogClient::new(config.catalog.catalog_url.clone(), config.catalog.timeout())?
            .with_metrics(metrics.clone()),
    );

    let cart_store = Arc::new(CartStore::new(
        catalog.clone(),
        catalog,
        repository,
        Arc::new(TracingNotificationSink),
    ));
    info!("Cart store initialized successfully");

    let app = create_app(metrics, cart_store);

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .context("Invalid server address")?;
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
        shutdown_observability().await;
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
