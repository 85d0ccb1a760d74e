use thiserror::Error;

use super::ProductId;

/// Errors raised by the remote catalog and stock lookups
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: ProductId },

    #[error("Catalog API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse catalog response: {0}")]
    Parse(String),
}

/// Repository-level errors for the durable cart slot
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Storage I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

/// Result type alias for catalog lookups
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;
