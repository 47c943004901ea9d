//! Storage domain - Key-value store abstraction

mod batch;
mod repository;

pub use batch::WriteBatch;
pub use repository::{decode, KeyValueStore, KeyValueStoreExt};

#[cfg(test)]
pub use repository::mock;
