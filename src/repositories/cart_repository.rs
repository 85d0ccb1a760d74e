use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::models::{Cart, RepositoryResult};

use super::KeyValueStorage;

/// Trait defining the interface for the durable cart slot
pub trait CartRepository: Send + Sync {
    /// Load the persisted cart, if any
    fn load_cart(&self) -> RepositoryResult<Option<Cart>>;

    /// Overwrite the persisted cart
    fn save_cart(&self, cart: &Cart) -> RepositoryResult<()>;
}

/// Cart repository over a key-value storage slot
pub struct StorageCartRepository {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl StorageCartRepository {
    /// Create a repository storing the cart under `key`
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    fn create_storage_span(&self, operation: &str) -> tracing::Span {
        tracing::debug_span!(
            "storage",
            "storage.operation" = operation,
            "storage.key" = %self.key,
            "otel.kind" = "internal",
            "otel.name" = format!("Storage.{}", operation),
        )
    }
}

impl CartRepository for StorageCartRepository {
    #[instrument(skip(self), fields(key = %self.key))]
    fn load_cart(&self) -> RepositoryResult<Option<Cart>> {
        let _span = self.create_storage_span("GetItem").entered();

        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No persisted cart found");
                return Ok(None);
            }
            Err(e) => {
                error!("Failed to read cart slot: {}", e);
                return Err(e);
            }
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => {
                info!("Loaded persisted cart with {} products", cart.len());
                Ok(Some(cart))
            }
            Err(e) => {
                warn!("Persisted cart is not valid JSON: {}", e);
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self, cart), fields(key = %self.key, product_count = cart.len()))]
    fn save_cart(&self, cart: &Cart) -> RepositoryResult<()> {
        let _span = self.create_storage_span("SetItem").entered();

        let raw = serde_json::to_string(cart)?;
        self.storage.set_item(&self.key, &raw).map_err(|e| {
            error!("Failed to write cart slot: {}", e);
            e
        })?;

        debug!("Cart persisted");
        Ok(())
    }
}
