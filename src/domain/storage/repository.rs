//! Key-value store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

use super::batch::WriteBatch;

/// Durable key-value store with prefix listing
///
/// Values are JSON documents so the trait stays dyn-compatible.
/// Use [`KeyValueStoreExt`] for typed access.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// Retrieves a value by key
    async fn get(&self, key: &str) -> Result<Option<Value>, DomainError>;

    /// Stores a single value, overwriting any existing one
    async fn put(&self, key: &str, value: Value) -> Result<(), DomainError> {
        let mut batch = WriteBatch::new();
        batch.put(key, value);
        self.commit(batch).await
    }

    /// Applies every write in the batch atomically
    ///
    /// Either all entries become visible or none do.
    async fn commit(&self, batch: WriteBatch) -> Result<(), DomainError>;

    /// Lists all entries whose key starts with `prefix`, ordered by key
    async fn list(&self, prefix: &str) -> Result<Vec<(String, Value)>, DomainError>;

    /// Counts entries whose key starts with `prefix`
    async fn count(&self, prefix: &str) -> Result<usize, DomainError> {
        Ok(self.list(prefix).await?.len())
    }

    /// Checks that the backend is reachable
    async fn ping(&self) -> Result<(), DomainError> {
        self.get("").await.map(|_| ())
    }
}

/// Decodes a stored JSON value into a typed one
pub fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, DomainError> {
    serde_json::from_value(value).map_err(|e| {
        DomainError::storage(format!("Failed to deserialize value for '{}': {}", key, e))
    })
}

/// Extension trait providing typed get/put operations
pub trait KeyValueStoreExt: KeyValueStore {
    /// Gets a typed value
    fn get_json<'a, T>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<T>, DomainError>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            match self.get(key).await? {
                Some(value) => Ok(Some(decode(key, value)?)),
                None => Ok(None),
            }
        }
    }

    /// Stores a typed value
    fn put_json<'a, T>(
        &'a self,
        key: &'a str,
        value: &'a T,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        T: Serialize + Send + Sync,
    {
        async move {
            let value = serde_json::to_value(value).map_err(|e| {
                DomainError::storage(format!("Failed to serialize value for '{}': {}", key, e))
            })?;
            self.put(key, value).await
        }
    }

    /// Lists typed values under a prefix, skipping the keys
    fn list_json<'a, T>(
        &'a self,
        prefix: &'a str,
    ) -> impl std::future::Future<Output = Result<Vec<T>, DomainError>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            self.list(prefix)
                .await?
                .into_iter()
                .map(|(key, value)| decode(&key, value))
                .collect()
        }
    }
}

// Blanket implementation for all types implementing KeyValueStore
impl<T: KeyValueStore + ?Sized> KeyValueStoreExt for T {}
