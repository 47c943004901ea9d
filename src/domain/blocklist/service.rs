//! Disposable domain lookup trait

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Answers whether a domain is a known disposable-email provider
#[async_trait]
pub trait DomainListService: Send + Sync + Debug {
    /// `domain` must already be lower-cased
    async fn is_disposable(&self, domain: &str) -> Result<bool, DomainError>;

    /// Number of domains currently tracked
    async fn count(&self) -> Result<usize, DomainError>;

    /// Re-fetches every source, persists the merged list and returns its size
    async fn refresh(&self) -> Result<usize, DomainError>;
}
