//! Infrastructure layer - External service implementations

pub mod challenge;
pub mod domain_list;
pub mod key_registry;
pub mod logging;
pub mod mail;
pub mod observability;
pub mod storage;
