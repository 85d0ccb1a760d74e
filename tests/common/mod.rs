#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::json;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shoecart_rs::models::{CatalogError, CatalogResult, Product, ProductId, StockEntry};
use shoecart_rs::repositories::{
    CatalogService, HttpCatalogClient, InMemoryStorage, KeyValueStorage, StockService,
    StorageCartRepository,
};
use shoecart_rs::services::RecordingNotificationSink;
use shoecart_rs::{create_app, CartStore, Metrics};

pub const CART_KEY: &str = "@RocketShoes:cart";

pub fn sneaker(id: ProductId, price: Decimal) -> Product {
    Product {
        id,
        title: format!("Tênis {}", id),
        price,
        image: format!("https://cdn.example.com/sneakers/{}.jpg", id),
        amount: 0,
    }
}

/// In-process catalog and stock service
#[derive(Default)]
pub struct FakeCatalog {
    products: Mutex<HashMap<ProductId, Product>>,
    stock: Mutex<HashMap<ProductId, u32>>,
    offline: AtomicBool,
    product_lookups: AtomicUsize,
    stock_lookups: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(self, product: Product, available: u32) -> Self {
        self.set_stock(product.id, available);
        self.products.lock().unwrap().insert(product.id, product);
        self
    }

    pub fn set_stock(&self, product_id: ProductId, available: u32) {
        self.stock.lock().unwrap().insert(product_id, available);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn product_lookups(&self) -> usize {
        self.product_lookups.load(Ordering::SeqCst)
    }

    pub fn stock_lookups(&self) -> usize {
        self.stock_lookups.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> CatalogResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CatalogError::Api {
                status: 503,
                message: "catalog offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn get_product(&self, product_id: ProductId) -> CatalogResult<Product> {
        self.product_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        self.products
            .lock()
            .unwrap()
            .get(&product_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                resource: "product".to_string(),
                id: product_id,
            })
    }
}

#[async_trait]
impl StockService for FakeCatalog {
    async fn get_stock(&self, product_id: ProductId) -> CatalogResult<StockEntry> {
        self.stock_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        self.stock
            .lock()
            .unwrap()
            .get(&product_id)
            .map(|&amount| StockEntry {
                id: product_id,
                amount,
            })
            .ok_or_else(|| CatalogError::NotFound {
                resource: "stock".to_string(),
                id: product_id,
            })
    }
}

/// A store wired to fakes, with handles on every collaborator
pub struct StoreHarness {
    pub store: CartStore,
    pub catalog: Arc<FakeCatalog>,
    pub storage: Arc<InMemoryStorage>,
    pub notifications: Arc<RecordingNotificationSink>,
}

impl StoreHarness {
    pub fn new(catalog: FakeCatalog) -> Self {
        Self::with_storage(catalog, Arc::new(InMemoryStorage::new()))
    }

    pub fn with_storage(catalog: FakeCatalog, storage: Arc<InMemoryStorage>) -> Self {
        let catalog = Arc::new(catalog);
        let notifications = Arc::new(RecordingNotificationSink::new());
        let repository = Arc::new(StorageCartRepository::new(storage.clone(), CART_KEY));

        let store = CartStore::new(
            catalog.clone(),
            catalog.clone(),
            repository,
            notifications.clone(),
        );

        Self {
            store,
            catalog,
            storage,
            notifications,
        }
    }

    /// The raw persisted slot, parsed as JSON
    pub fn stored_json(&self) -> Option<serde_json::Value> {
        self.storage
            .get_item(CART_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    /// Products in the persisted slot
    pub fn stored_products(&self) -> Vec<Product> {
        self.storage
            .get_item(CART_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
            .unwrap_or_default()
    }
}

/// Mount a product and its stock on a mock catalog server
pub async fn mount_product(server: &MockServer, id: ProductId, price: f64, available: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/products/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "title": format!("Tênis {}", id),
            "price": price,
            "image": format!("https://cdn.example.com/sneakers/{}.jpg", id),
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/stock/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "amount": available,
        })))
        .mount(server)
        .await;
}

/// The full HTTP application served on a local port, backed by a mock catalog
pub struct TestEnvironment {
    pub client: Client,
    pub base_url: String,
    pub catalog: MockServer,
    pub storage: Arc<InMemoryStorage>,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let catalog = MockServer::start().await;
        let storage = Arc::new(InMemoryStorage::new());

        let metrics = Arc::new(Metrics::new().unwrap());
        let client = Arc::new(
            HttpCatalogClient::new(catalog.uri(), Duration::from_secs(2))
                .unwrap()
                .with_metrics(metrics.clone()),
        );
        let repository = Arc::new(StorageCartRepository::new(storage.clone(), CART_KEY));
        let store = Arc::new(CartStore::new(
            client.clone(),
            client,
            repository,
            Arc::new(RecordingNotificationSink::new()),
        ));

        let app = create_app(metrics, store);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{}", addr),
            catalog,
            storage,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
