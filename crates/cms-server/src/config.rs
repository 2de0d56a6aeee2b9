// ABOUTME: Configuration loading and validation for the travel-cms server.
// ABOUTME: Reads CMS_* environment variables with documented defaults and opens the configured store.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use cms_store::{DocumentStore, MemoryStore, SqliteStore, StoreError};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CMS_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("CMS_STORE must be \"sqlite\" or \"memory\", got {0:?}")]
    InvalidStore(String),

    #[error("CMS_STORE_TIMEOUT_MS must be a whole number of milliseconds, got {0:?}")]
    InvalidTimeout(String),
}

/// Which DocumentStore implementation backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::InvalidStore(s.to_string())),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CmsConfig {
    pub bind: SocketAddr,
    pub store: StoreBackend,
    pub db_path: PathBuf,
    pub store_timeout: Duration,
}

impl CmsConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - CMS_BIND: socket address to bind (default: 127.0.0.1:8000)
    /// - CMS_STORE: `sqlite` or `memory` (default: sqlite)
    /// - CMS_DB_PATH: SQLite database file (default: travel-cms.db)
    /// - CMS_STORE_TIMEOUT_MS: how long a write waits on a locked database (default: 5000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_str = var("CMS_BIND").unwrap_or_else(|| "127.0.0.1:8000".to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let store = match var("CMS_STORE") {
            Some(s) => s.parse()?,
            None => StoreBackend::Sqlite,
        };

        let db_path = var("CMS_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("travel-cms.db"));

        let store_timeout = match var("CMS_STORE_TIMEOUT_MS") {
            Some(ms) => Duration::from_millis(
                ms.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(ms))?,
            ),
            None => cms_store::DEFAULT_BUSY_TIMEOUT,
        };

        Ok(Self {
            bind,
            store,
            db_path,
            store_timeout,
        })
    }

    /// Open the configured store.
    pub fn open_store(&self) -> Result<Arc<dyn DocumentStore>, StoreError> {
        match self.store {
            StoreBackend::Sqlite => {
                let store = SqliteStore::open(&self.db_path, self.store_timeout)?;
                tracing::info!(path = %self.db_path.display(), "opened sqlite store");
                Ok(Arc::new(store))
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory store; records are lost on shutdown");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<CmsConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CmsConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn config_loads_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.bind, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.store, StoreBackend::Sqlite);
        assert_eq!(config.db_path, PathBuf::from("travel-cms.db"));
        assert_eq!(config.store_timeout, Duration::from_secs(5));
    }

    #[test]
    fn config_reads_overrides() {
        let config = load(&[
            ("CMS_BIND", "0.0.0.0:9090"),
            ("CMS_STORE", "Memory"),
            ("CMS_DB_PATH", "/var/lib/cms/data.db"),
            ("CMS_STORE_TIMEOUT_MS", "250"),
        ])
        .unwrap();

        assert_eq!(config.bind.port(), 9090);
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.db_path, PathBuf::from("/var/lib/cms/data.db"));
        assert_eq!(config.store_timeout, Duration::from_millis(250));
    }

    #[test]
    fn config_treats_empty_values_as_unset() {
        let config = load(&[("CMS_BIND", ""), ("CMS_STORE", "  ")]).unwrap();
        assert_eq!(config.bind.port(), 8000);
        assert_eq!(config.store, StoreBackend::Sqlite);
    }

    #[test]
    fn config_rejects_bad_values() {
        let err = load(&[("CMS_BIND", "not-an-address")]).unwrap_err();
        assert!(err.to_string().contains("CMS_BIND"), "{}", err);

        let err = load(&[("CMS_STORE", "mongodb")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStore(_)));

        let err = load(&[("CMS_STORE_TIMEOUT_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(_)));
    }

    #[tokio::test]
    async fn memory_config_opens_working_store() {
        let config = load(&[("CMS_STORE", "memory")]).unwrap();
        let store = config.open_store().unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert_eq!(store.increment_counter("itineraries_seq").await.unwrap(), 1);
    }
}
