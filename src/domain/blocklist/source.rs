//! Blocklist source trait

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// A remote list of disposable email domains
#[async_trait]
pub trait BlocklistSource: Send + Sync + Debug {
    /// Identifier used in logs
    fn name(&self) -> &str;

    /// Fetches and parses the list
    async fn fetch(&self) -> Result<Vec<String>, DomainError>;
}
