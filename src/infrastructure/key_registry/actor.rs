//! Single-writer task around the key registry
//!
//! Every operation is sent as a [`Command`] over a bounded channel to one
//! task that owns the [`KeyRegistry`] and runs each command to completion
//! before taking the next. Replies come back over a oneshot channel.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::key_registry::{
    AccountFilter, AccountInfo, AccountPage, CreatedKey, DomainReport, GlobalStats, KeyInfo,
    KeyRegistryService, LimitChange, ValidationOutcome,
};
use crate::domain::DomainError;

use super::registry::KeyRegistry;

/// Default depth of the command queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

type Reply<T> = oneshot::Sender<Result<T, DomainError>>;

#[derive(Debug)]
enum Command {
    CreateKey {
        email: String,
        reply: Reply<CreatedKey>,
    },
    ValidateAndIncrement {
        api_key: String,
        reply: Reply<ValidationOutcome>,
    },
    GetKeyInfo {
        email: String,
        reply: Reply<Option<KeyInfo>>,
    },
    IncrementGlobalCheckCount {
        reply: Reply<u64>,
    },
    GetGlobalStats {
        reply: Reply<GlobalStats>,
    },
    GetAccountByEmail {
        email: String,
        reply: Reply<Option<AccountInfo>>,
    },
    UpdateDailyLimit {
        email: String,
        new_limit: i64,
        reply: Reply<Option<LimitChange>>,
    },
    ListAccounts {
        filter: AccountFilter,
        reply: Reply<AccountPage>,
    },
    ReportDomain {
        domain: String,
        reason: Option<String>,
        reply: Reply<DomainReport>,
    },
    ListReports {
        reply: Reply<Vec<DomainReport>>,
    },
    CommunityReportCount {
        reply: Reply<u64>,
    },
}

/// Cloneable handle to the registry task
#[derive(Debug, Clone)]
pub struct KeyRegistryHandle {
    sender: mpsc::Sender<Command>,
}

impl KeyRegistryHandle {
    /// Spawns the registry task on the current runtime
    ///
    /// The task stops once every handle has been dropped.
    pub fn spawn(registry: KeyRegistry, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(run(registry, receiver));
        (Self { sender }, task)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, DomainError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| DomainError::storage("Key registry is not running"))?;

        response
            .await
            .map_err(|_| DomainError::storage("Key registry is not running"))?
    }
}

async fn run(registry: KeyRegistry, mut receiver: mpsc::Receiver<Command>) {
    info!("Key registry task started");

    while let Some(command) = receiver.recv().await {
        // A caller that went away no longer needs its reply
        match command {
            Command::CreateKey { email, reply } => {
                let _ = reply.send(registry.create_key(&email).await);
            }
            Command::ValidateAndIncrement { api_key, reply } => {
                let _ = reply.send(registry.validate_and_increment(&api_key).await);
            }
            Command::GetKeyInfo { email, reply } => {
                let _ = reply.send(registry.get_key_info(&email).await);
            }
            Command::IncrementGlobalCheckCount { reply } => {
                let _ = reply.send(registry.increment_global_check_count().await);
            }
            Command::GetGlobalStats { reply } => {
                let _ = reply.send(registry.get_global_stats().await);
            }
            Command::GetAccountByEmail { email, reply } => {
                let _ = reply.send(registry.get_account_by_email(&email).await);
            }
            Command::UpdateDailyLimit {
                email,
                new_limit,
                reply,
            } => {
                let _ = reply.send(registry.update_daily_limit(&email, new_limit).await);
            }
            Command::ListAccounts { filter, reply } => {
                let _ = reply.send(registry.list_accounts(filter).await);
            }
            Command::ReportDomain {
                domain,
                reason,
                reply,
            } => {
                let _ = reply.send(registry.report_domain(&domain, reason).await);
            }
            Command::ListReports { reply } => {
                let _ = reply.send(registry.list_reports().await);
            }
            Command::CommunityReportCount { reply } => {
                let _ = reply.send(registry.community_report_count().await);
            }
        }
    }

    debug!("Key registry task stopped");
}

#[async_trait]
impl KeyRegistryService for KeyRegistryHandle {
    async fn create_key(&self, email: &str) -> Result<CreatedKey, DomainError> {
        let email = email.to_string();
        self.request(|reply| Command::CreateKey { email, reply })
            .await
    }

    async fn validate_and_increment(
        &self,
        api_key: &str,
    ) -> Result<ValidationOutcome, DomainError> {
        let api_key = api_key.to_string();
        self.request(|reply| Command::ValidateAndIncrement { api_key, reply })
            .await
    }

    async fn get_key_info(&self, email: &str) -> Result<Option<KeyInfo>, DomainError> {
        let email = email.to_string();
        self.request(|reply| Command::GetKeyInfo { email, reply })
            .await
    }

    async fn increment_global_check_count(&self) -> Result<u64, DomainError> {
        self.request(|reply| Command::IncrementGlobalCheckCount { reply })
            .await
    }

    async fn get_global_stats(&self) -> Result<GlobalStats, DomainError> {
        self.request(|reply| Command::GetGlobalStats { reply }).await
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<AccountInfo>, DomainError> {
        let email = email.to_string();
        self.request(|reply| Command::GetAccountByEmail { email, reply })
            .await
    }

    async fn update_daily_limit(
        &self,
        email: &str,
        new_limit: i64,
    ) -> Result<Option<LimitChange>, DomainError> {
        let email = email.to_string();
        self.request(|reply| Command::UpdateDailyLimit {
            email,
            new_limit,
            reply,
        })
        .await
    }

    async fn list_accounts(&self, filter: AccountFilter) -> Result<AccountPage, DomainError> {
        self.request(|reply| Command::ListAccounts { filter, reply })
            .await
    }

    async fn report_domain(
        &self,
        domain: &str,
        reason: Option<String>,
    ) -> Result<DomainReport, DomainError> {
        let domain = domain.to_string();
        self.request(|reply| Command::ReportDomain {
            domain,
            reason,
            reply,
        })
        .await
    }

    async fn list_reports(&self) -> Result<Vec<DomainReport>, DomainError> {
        self.request(|reply| Command::ListReports { reply }).await
    }

    async fn community_report_count(&self) -> Result<u64, DomainError> {
        self.request(|reply| Command::CommunityReportCount { reply })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::mock::ManualClock;
    use crate::domain::storage::mock::MockKeyValueStore;
    use crate::domain::{KeyValueStore, RejectionReason};
    use futures::future::join_all;
    use std::sync::Arc;

    fn spawn_registry() -> (KeyRegistryHandle, JoinHandle<()>, Arc<MockKeyValueStore>) {
        let store = Arc::new(MockKeyValueStore::new());
        let registry = KeyRegistry::new(store.clone(), Arc::new(ManualClock::fixed()));
        let (handle, task) = KeyRegistryHandle::spawn(registry, 16);
        (handle, task, store)
    }

    #[tokio::test]
    async fn test_handle_round_trip() {
        let (handle, _task, _store) = spawn_registry();

        let created = handle.create_key("a@x.com").await.unwrap();
        let outcome = handle.validate_and_increment(&created.api_key).await.unwrap();
        let info = handle.get_key_info("a@x.com").await.unwrap().unwrap();

        assert_eq!(outcome.remaining(), Some(999));
        assert_eq!(info.requests_today, 1);
        assert_eq!(handle.get_global_stats().await.unwrap().total_api_keys, 1);
    }

    #[tokio::test]
    async fn test_concurrent_validations_never_exceed_limit() {
        let (handle, _task, _store) = spawn_registry();
        let created = handle.create_key("a@x.com").await.unwrap();
        handle.update_daily_limit("a@x.com", 25).await.unwrap();

        let calls = (0..100).map(|_| {
            let handle = handle.clone();
            let api_key = created.api_key.clone();
            tokio::spawn(async move { handle.validate_and_increment(&api_key).await })
        });
        let outcomes: Vec<_> = join_all(calls)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        let accepted = outcomes.iter().filter(|o| o.is_valid()).count();
        let limited = outcomes
            .iter()
            .filter(|o| o.rejection() == Some(RejectionReason::RateLimitExceeded))
            .count();
        assert_eq!(accepted, 25);
        assert_eq!(limited, 75);

        let account = handle.get_account_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(account.requests_today, 25);
        assert_eq!(account.total_usage, 25);
        assert_eq!(
            handle.get_global_stats().await.unwrap().total_emails_checked,
            25
        );
    }

    #[tokio::test]
    async fn test_concurrent_creates_issue_one_key() {
        let (handle, _task, store) = spawn_registry();

        let calls = (0..20).map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move { handle.create_key("a@x.com").await })
        });
        let created: Vec<_> = join_all(calls)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        assert_eq!(created.iter().filter(|c| c.is_new).count(), 1);
        assert!(created.iter().all(|c| c.api_key == created[0].api_key));
        assert_eq!(store.count("lookup:").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_global_increments() {
        let (handle, _task, _store) = spawn_registry();

        let calls = (0..50).map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move { handle.increment_global_check_count().await })
        });
        let mut counts: Vec<u64> = join_all(calls)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();
        counts.sort_unstable();

        assert_eq!(counts, (1..=50).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_storage_errors_reach_the_caller() {
        let (handle, _task, store) = spawn_registry();
        store.set_fail_writes(true);

        let result = handle.create_key("a@x.com").await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));

        // The task keeps serving after a failed command
        store.set_fail_writes(false);
        tokio_test::assert_ok!(handle.create_key("a@x.com").await);
    }

    #[tokio::test]
    async fn test_huge_registration_window_keeps_task_alive() {
        let (handle, _task, _store) = spawn_registry();
        handle.create_key("a@x.com").await.unwrap();

        let page = handle
            .list_accounts(AccountFilter::default().registered_within_days(100_000_000))
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);

        let info = handle.get_key_info("a@x.com").await.unwrap();
        assert!(info.is_some());
    }

    #[tokio::test]
    async fn test_stopped_registry_is_unavailable() {
        let (handle, task, _store) = spawn_registry();
        task.abort();
        let _ = task.await;

        let result = handle.get_global_stats().await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_reports_through_handle() {
        let (handle, _task, _store) = spawn_registry();

        handle
            .report_domain("temp.io", Some("seen in signups".to_string()))
            .await
            .unwrap();

        assert_eq!(handle.community_report_count().await.unwrap(), 1);
        assert_eq!(handle.list_reports().await.unwrap().len(), 1);
        let page = handle.list_accounts(AccountFilter::default()).await.unwrap();
        assert_eq!(page.total_count, 0);
    }
}
