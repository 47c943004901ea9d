//! Disposable domain list infrastructure

mod scheduler;
mod service;
mod source;

pub use scheduler::spawn_refresh_task;
pub use service::{DomainList, DEFAULT_CACHE_TTL};
pub use source::{build_http_client, HttpBlocklistSource, DEFAULT_SOURCES, DEFAULT_USER_AGENT};
