//! Key registry infrastructure
//!
//! The registry state machine, its single-writer task and key generation.

mod actor;
mod generator;
mod registry;

pub use actor::{KeyRegistryHandle, DEFAULT_QUEUE_CAPACITY};
pub use generator::{ApiKeyGenerator, DEFAULT_KEY_LENGTH};
pub use registry::KeyRegistry;
