//! Write batches committed atomically by a key-value store

use serde::Serialize;
use serde_json::Value;

use crate::domain::DomainError;

/// A set of writes that a [`KeyValueStore`](super::KeyValueStore) commits
/// together or not at all.
///
/// Later writes to the same key replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    entries: Vec<(String, Value)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw JSON value
    pub fn put(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.entries.push((key.into(), value));
        self
    }

    /// Serializes a value and adds it
    pub fn put_json<T>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self, DomainError>
    where
        T: Serialize + ?Sized,
    {
        let key = key.into();
        let value = serde_json::to_value(value).map_err(|e| {
            DomainError::storage(format!("Failed to serialize value for '{}': {}", key, e))
        })?;

        Ok(self.put(key, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn into_entries(self) -> Vec<(String, Value)> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_preserves_order() {
        let mut batch = WriteBatch::new();
        batch.put("b", json!(1)).put("a", json!(2));

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_put_json_serializes() {
        #[derive(Serialize)]
        struct Counter {
            value: u64,
        }

        let mut batch = WriteBatch::new();
        batch.put_json("counter", &Counter { value: 7 }).unwrap();

        let entries = batch.into_entries();
        assert_eq!(entries[0].1, json!({ "value": 7 }));
    }

    #[test]
    fn test_empty_batch() {
        let batch = WriteBatch::new();
        assert!(batch.is_empty());
    }
}
