use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shoecart_rs::models::CatalogError;
use shoecart_rs::repositories::{CatalogService, HttpCatalogClient, StockService};
use shoecart_rs::Metrics;

mod common;
use common::mount_product;

fn client_for(server: &MockServer) -> HttpCatalogClient {
    HttpCatalogClient::new(server.uri(), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_get_product() {
    let server = MockServer::start().await;
    mount_product(&server, 1, 179.9, 3).await;

    let product = client_for(&server).get_product(1).await.unwrap();

    assert_eq!(product.id, 1);
    assert_eq!(product.title, "Tênis 1");
    assert_eq!(product.price, dec!(179.9));
    assert_eq!(product.amount, 0);
}

#[tokio::test]
async fn test_get_stock() {
    let server = MockServer::start().await;
    mount_product(&server, 4, 99.0, 7).await;

    let stock = client_for(&server).get_stock(4).await.unwrap();

    assert_eq!(stock.id, 4);
    assert_eq!(stock.amount, 7);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/42"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client_for(&server).get_product(42).await;

    match result {
        Err(CatalogError::NotFound { resource, id }) => {
            assert_eq!(resource, "product");
            assert_eq!(id, 42);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&server)
        .await;

    let result = client_for(&server).get_stock(1).await;

    match result {
        Err(CatalogError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database down");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "one"})))
        .mount(&server)
        .await;

    let result = client_for(&server).get_product(1).await;

    assert!(matches!(result, Err(CatalogError::Parse(_))));
}

#[tokio::test]
async fn test_slow_catalog_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 1, "amount": 1}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = HttpCatalogClient::new(server.uri(), Duration::from_millis(100)).unwrap();
    let result = client.get_stock(1).await;

    assert!(matches!(result, Err(CatalogError::Http(_))));
}

#[tokio::test]
async fn test_lookups_are_recorded_in_metrics() {
    let server = MockServer::start().await;
    mount_product(&server, 1, 10.0, 2).await;

    let metrics = Arc::new(Metrics::new().unwrap());
    let client = client_for(&server).with_metrics(metrics.clone());

    client.get_product(1).await.unwrap();
    client.get_stock(1).await.unwrap();
    let _ = client.get_product(2).await;

    let success = metrics
        .catalog_requests_total
        .with_label_values(&["products", "success"])
        .get();
    let not_found = metrics
        .catalog_requests_total
        .with_label_values(&["products", "not_found"])
        .get();

    assert_eq!(success, 1.0);
    assert_eq!(not_found, 1.0);
}
