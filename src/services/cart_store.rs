use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::models::{Cart, CartOutcome, ProductId, UpdateProductAmount};
use crate::repositories::{CartRepository, CatalogService, StockService};

use super::notifications::{
    NotificationSink, ADD_PRODUCT_FAILED, OUT_OF_STOCK, REMOVE_PRODUCT_FAILED,
    UPDATE_AMOUNT_FAILED,
};
use super::subscribers::{SubscriptionId, Subscribers};

/// Shopping cart state container
///
/// Owns the in-memory cart, keeps it in sync with the durable cart slot and
/// validates additions and quantity changes against the remote catalog and
/// stock services. Every mutation is persisted before it becomes visible in
/// memory; a failed mutation leaves both untouched.
pub struct CartStore {
    catalog: Arc<dyn CatalogService>,
    stock: Arc<dyn StockService>,
    repository: Arc<dyn CartRepository>,
    notifications: Arc<dyn NotificationSink>,
    subscribers: Subscribers,
    state: RwLock<CartState>,
    // Version of the last cart handed to subscribers
    notified: Mutex<u64>,
}

/// The current cart and the number of commits that produced it
#[derive(Debug, Default)]
struct CartState {
    cart: Cart,
    version: u64,
}

impl CartStore {
    /// Create a store, restoring the cart from the repository.
    ///
    /// An empty or unreadable slot starts an empty cart. No catalog or stock
    /// requests are made here.
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        stock: Arc<dyn StockService>,
        repository: Arc<dyn CartRepository>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        let cart = Self::initial_cart(repository.as_ref());

        Self {
            catalog,
            stock,
            repository,
            notifications,
            subscribers: Subscribers::new(),
            state: RwLock::new(CartState { cart, version: 0 }),
            notified: Mutex::new(0),
        }
    }

    fn initial_cart(repository: &dyn CartRepository) -> Cart {
        match repository.load_cart() {
            Ok(Some(cart)) => {
                info!("Restored cart with {} products", cart.len());
                cart
            }
            Ok(None) => {
                info!("No stored cart, starting empty");
                Cart::new()
            }
            Err(e) => {
                warn!("Could not restore stored cart, starting empty: {}", e);
                Cart::new()
            }
        }
    }

    /// Current cart contents
    pub fn cart(&self) -> Cart {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cart
            .clone()
    }

    /// Register a callback invoked with the new cart after every successful mutation.
    ///
    /// Listeners never see an older cart after a newer one. When commits race,
    /// a cart already superseded by the time it would be delivered is skipped.
    /// A listener may read the store but must not mutate it.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Cart) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart goes through `update_product_amount`
    /// with its amount plus one, so the stock check applies.
    #[instrument(skip(self))]
    pub async fn add_product(&self, product_id: ProductId) -> CartOutcome {
        info!("Adding product to cart");

        if let Some(existing) = self.cart().get(product_id) {
            let Some(amount) = existing.amount.checked_add(1) else {
                warn!("Product amount already at its maximum");
                self.notifications.error(OUT_OF_STOCK);
                return CartOutcome::StockExceeded {
                    requested: u32::MAX,
                    available: existing.amount,
                };
            };
            debug!(amount, "Product already in cart, incrementing amount");
            return self
                .update_product_amount(UpdateProductAmount { product_id, amount })
                .await;
        }

        let mut product = match self.catalog.get_product(product_id).await {
            Ok(product) => product,
            Err(e) => {
                error!("Product lookup failed: {}", e);
                self.notifications.error(ADD_PRODUCT_FAILED);
                return CartOutcome::LookupFailed {
                    reason: e.to_string(),
                };
            }
        };
        product.amount = 1;

        self.commit(|cart| cart.with_product(product), ADD_PRODUCT_FAILED)
    }

    /// Remove a product line. Removing an absent product is not an error.
    #[instrument(skip(self))]
    pub fn remove_product(&self, product_id: ProductId) -> CartOutcome {
        info!("Removing product from cart");

        self.commit(|cart| cart.without(product_id), REMOVE_PRODUCT_FAILED)
    }

    /// Set the amount of a product line after checking it against stock.
    ///
    /// The stock check runs for every change, decreases included.
    #[instrument(
        skip(self, request),
        fields(product_id = request.product_id, amount = request.amount)
    )]
    pub async fn update_product_amount(&self, request: UpdateProductAmount) -> CartOutcome {
        info!("Updating product amount");

        let stock = match self.stock.get_stock(request.product_id).await {
            Ok(stock) => stock,
            Err(e) => {
                error!("Stock lookup failed: {}", e);
                self.notifications.error(UPDATE_AMOUNT_FAILED);
                return CartOutcome::LookupFailed {
                    reason: e.to_string(),
                };
            }
        };

        if request.amount > stock.amount {
            warn!(available = stock.amount, "Requested amount exceeds stock");
            self.notifications.error(OUT_OF_STOCK);
            return CartOutcome::StockExceeded {
                requested: request.amount,
                available: stock.amount,
            };
        }

        self.commit(
            |cart| cart.with_amount(request.product_id, request.amount),
            UPDATE_AMOUNT_FAILED,
        )
    }

    /// Apply `change` to the current cart, persist the result, then swap it in.
    ///
    /// The write lock is held across the storage write so memory and storage
    /// always end on the same cart, and each change sees the latest commit.
    fn commit<F>(&self, change: F, failure_message: &str) -> CartOutcome
    where
        F: FnOnce(&Cart) -> Cart,
    {
        let (next, version) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let next = change(&state.cart);

            if let Err(e) = self.repository.save_cart(&next) {
                error!("Failed to persist cart: {}", e);
                drop(state);
                self.notifications.error(failure_message);
                return CartOutcome::Failed {
                    reason: e.to_string(),
                };
            }

            state.cart = next.clone();
            state.version += 1;
            (next, state.version)
        };

        info!(
            products = next.len(),
            units = next.total_units(),
            version,
            "Cart updated"
        );
        self.notify_subscribers(&next, version);
        CartOutcome::Ok
    }

    /// Deliver `cart` unless a later commit has already been delivered
    fn notify_subscribers(&self, cart: &Cart, version: u64) {
        let mut notified = self.notified.lock().unwrap_or_else(PoisonError::into_inner);
        if version <= *notified {
            debug!(version, latest = *notified, "Skipping superseded cart notification");
            return;
        }

        self.subscribers.notify(cart);
        *notified = version;
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart())
            .field("subscribers", &self.subscribers)
            .finish()
    }
}
