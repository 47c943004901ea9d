//! Storage infrastructure - Key-value store implementations

mod factory;
mod in_memory;
mod postgres;

pub use factory::{StorageConfig, StorageFactory, StorageType, DEFAULT_TABLE_NAME};
pub use in_memory::InMemoryKeyValueStore;
pub use postgres::{validate_table_name, PostgresConfig, PostgresKeyValueStore};
