use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Environment prefix for every setting, e.g. `SHOECART_PORT`
pub const ENV_PREFIX: &str = "SHOECART";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {message}")]
    LoadError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub storage: StorageConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    #[serde(default = "default_catalog_timeout")]
    pub catalog_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    #[serde(default = "default_cart_storage_key")]
    pub cart_storage_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub enable_json_logging: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Load every section from environment variables named `{prefix}_{FIELD}`
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        info!("Loading configuration from environment");

        let config = Config {
            server: ServerConfig::from_env_with_prefix(prefix)?,
            catalog: CatalogConfig::from_env_with_prefix(prefix)?,
            storage: StorageConfig::from_env_with_prefix(prefix)?,
            observability: ObservabilityConfig::from_env_with_prefix(prefix)?,
        };

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!("Configuration: {:?}", config);

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "Server port cannot be 0".to_string(),
            });
        }

        if self.catalog.catalog_url.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Catalog URL cannot be empty".to_string(),
            });
        }

        if self.catalog.catalog_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "Catalog timeout cannot be 0".to_string(),
            });
        }

        if self.storage.storage_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Storage path cannot be empty".to_string(),
            });
        }

        if self.storage.cart_storage_key.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Cart storage key cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn load_section<T>(prefix: &str, section: &str) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let settings = config::Config::builder()
        .add_source(config::Environment::with_prefix(prefix))
        .build()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to load {} config: {}", section, e),
        })?;

    settings
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to deserialize {} config: {}", section, e),
        })
}

impl ServerConfig {
    pub(crate) fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        load_section(prefix, "server")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl CatalogConfig {
    pub(crate) fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        load_section(prefix, "catalog")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_seconds)
    }
}

impl StorageConfig {
    pub(crate) fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        load_section(prefix, "storage")
    }
}

impl ObservabilityConfig {
    pub(crate) fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        load_section(prefix, "observability")
    }
}

// Default value functions
pub(crate) fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub(crate) fn default_port() -> u16 {
    3000
}

pub(crate) fn default_catalog_url() -> String {
    "http://localhost:3333".to_string()
}

pub(crate) fn default_catalog_timeout() -> u64 {
    10
}

pub(crate) fn default_storage_path() -> PathBuf {
    PathBuf::from(".shoecart/storage.json")
}

pub(crate) fn default_cart_storage_key() -> String {
    "@RocketShoes:cart".to_string()
}

pub(crate) fn default_service_name() -> String {
    "shoecart-rs".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}
