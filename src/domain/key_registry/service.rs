//! Key registry service trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::DomainReport;
use super::types::{
    AccountFilter, AccountInfo, AccountPage, CreatedKey, GlobalStats, KeyInfo, LimitChange,
    ValidationOutcome,
};
use crate::domain::DomainError;

/// Operations on per-email keys, quotas and global counters
///
/// Expected conditions (unknown key, exhausted quota, missing account) are
/// reported through return values. Errors are reserved for storage failures.
#[async_trait]
pub trait KeyRegistryService: Send + Sync + Debug {
    /// Returns the existing key for `email` or issues a new one
    async fn create_key(&self, email: &str) -> Result<CreatedKey, DomainError>;

    /// Checks a presented key against its quota and counts the request
    async fn validate_and_increment(&self, api_key: &str)
    -> Result<ValidationOutcome, DomainError>;

    async fn get_key_info(&self, email: &str) -> Result<Option<KeyInfo>, DomainError>;

    /// Counts one successful email check and returns the new total
    async fn increment_global_check_count(&self) -> Result<u64, DomainError>;

    async fn get_global_stats(&self) -> Result<GlobalStats, DomainError>;

    async fn get_account_by_email(&self, email: &str) -> Result<Option<AccountInfo>, DomainError>;

    /// Sets a clamped daily limit override; `None` when the account is unknown
    async fn update_daily_limit(
        &self,
        email: &str,
        new_limit: i64,
    ) -> Result<Option<LimitChange>, DomainError>;

    async fn list_accounts(&self, filter: AccountFilter) -> Result<AccountPage, DomainError>;

    /// Records a community report that `domain` is disposable
    async fn report_domain(
        &self,
        domain: &str,
        reason: Option<String>,
    ) -> Result<DomainReport, DomainError>;

    /// All reports, most reported first
    async fn list_reports(&self) -> Result<Vec<DomainReport>, DomainError>;

    async fn community_report_count(&self) -> Result<u64, DomainError>;
}
