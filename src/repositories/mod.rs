// Repositories module - data access layer

pub mod cart_repository;
pub mod catalog_client;
pub mod storage;

pub use cart_repository::{CartRepository, StorageCartRepository};
pub use catalog_client::{CatalogService, HttpCatalogClient, StockService};
pub use storage::{FileStorage, InMemoryStorage, KeyValueStorage};
