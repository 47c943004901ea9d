//! Storage factory for runtime backend selection

use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::domain::storage::KeyValueStore;
use crate::domain::DomainError;

use super::in_memory::InMemoryKeyValueStore;
use super::postgres::{PostgresConfig, PostgresKeyValueStore};

/// Default table for the PostgreSQL backend
pub const DEFAULT_TABLE_NAME: &str = "kv_store";

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(DomainError::configuration(format!(
                "Unknown storage backend '{}'",
                other
            ))),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage configuration
    InMemory,
    /// PostgreSQL storage configuration
    Postgres {
        config: PostgresConfig,
        table_name: String,
    },
}

impl StorageConfig {
    /// Creates an in-memory storage configuration
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Creates a PostgreSQL configuration from a URL
    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self::Postgres {
            config: PostgresConfig::new(url),
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres { .. } => StorageType::Postgres,
        }
    }
}

/// Factory for creating store instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates a store based on the configuration
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, DomainError> {
        match config {
            StorageConfig::InMemory => {
                info!("Using in-memory storage");
                Ok(Arc::new(InMemoryKeyValueStore::new()))
            }
            StorageConfig::Postgres { config, table_name } => {
                info!("Using PostgreSQL storage: table={}", table_name);
                let store = PostgresKeyValueStore::connect(config, table_name.as_str()).await?;
                store.ensure_table().await?;
                Ok(Arc::new(store))
            }
        }
    }
}
