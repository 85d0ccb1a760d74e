use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::models::{CartOutcome, CartResponse, ProductId, UpdateProductAmount};
use crate::observability::CartOperationTracer;
use crate::services::notifications::{
    ADD_PRODUCT_FAILED, OUT_OF_STOCK, REMOVE_PRODUCT_FAILED, UPDATE_AMOUNT_FAILED,
};
use crate::services::CartStore;

/// Body of `POST /api/cart/items`
#[derive(Debug, Clone, Deserialize)]
pub struct AddProductRequest {
    pub product_id: ProductId,
}

/// Body of `PUT /api/cart/items/:product_id`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAmountRequest {
    pub amount: u32,
}

/// State for cart handlers
#[derive(Clone)]
pub struct CartHandlerState {
    pub cart_store: Arc<CartStore>,
    pub tracer: CartOperationTracer,
}

type CartResult = Result<Json<CartResponse>, (StatusCode, Json<Value>)>;

/// Create cart router with all endpoints
pub fn create_cart_router(cart_store: Arc<CartStore>, tracer: CartOperationTracer) -> Router {
    let state = CartHandlerState { cart_store, tracer };

    Router::new()
        .route("/api/cart", get(get_cart))
        .route("/api/cart/items", post(add_product))
        .route(
            "/api/cart/items/:product_id",
            put(update_product_amount).delete(remove_product),
        )
        .with_state(state)
}

/// Get the current cart
#[instrument(skip(state))]
pub async fn get_cart(State(state): State<CartHandlerState>) -> Json<CartResponse> {
    let cart = state.cart_store.cart();
    info!("Returning cart with {} products", cart.len());

    Json(cart.to_response())
}

/// Add one unit of a product to the cart
#[instrument(skip(state, request))]
pub async fn add_product(
    State(state): State<CartHandlerState>,
    Json(request): Json<AddProductRequest>,
) -> CartResult {
    let outcome = state
        .tracer
        .trace(
            "add_product",
            state.cart_store.add_product(request.product_id),
        )
        .await;

    outcome_to_response(&state, outcome, ADD_PRODUCT_FAILED)
}

/// Set the amount of a product already in the cart
#[instrument(skip(state, request))]
pub async fn update_product_amount(
    State(state): State<CartHandlerState>,
    Path(product_id): Path<ProductId>,
    Json(request): Json<UpdateAmountRequest>,
) -> CartResult {
    let update = UpdateProductAmount {
        product_id,
        amount: request.amount,
    };

    let outcome = state
        .tracer
        .trace(
            "update_product_amount",
            state.cart_store.update_product_amount(update),
        )
        .await;

    outcome_to_response(&state, outcome, UPDATE_AMOUNT_FAILED)
}

/// Remove a product from the cart
#[instrument(skip(state))]
pub async fn remove_product(
    State(state): State<CartHandlerState>,
    Path(product_id): Path<ProductId>,
) -> CartResult {
    let store = state.cart_store.clone();
    let outcome = state
        .tracer
        .trace("remove_product", async move {
            store.remove_product(product_id)
        })
        .await;

    outcome_to_response(&state, outcome, REMOVE_PRODUCT_FAILED)
}

/// Convert a cart outcome to an HTTP response
fn outcome_to_response(
    state: &CartHandlerState,
    outcome: CartOutcome,
    failure_message: &str,
) -> CartResult {
    let (status, message) = match &outcome {
        CartOutcome::Ok => return Ok(Json(state.cart_store.cart().to_response())),
        CartOutcome::StockExceeded { .. } => (StatusCode::CONFLICT, OUT_OF_STOCK),
        CartOutcome::LookupFailed { .. } => (StatusCode::BAD_GATEWAY, failure_message),
        CartOutcome::Failed { .. } => (StatusCode::INTERNAL_SERVER_ERROR, failure_message),
    };

    warn!(status = status.as_u16(), outcome = %outcome, "Cart operation not applied");

    Err((
        status,
        Json(json!({
            "error": message,
            "outcome": outcome,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    ))
}
