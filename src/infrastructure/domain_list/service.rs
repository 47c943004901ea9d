//! Disposable domain list backed by the key-value store
//!
//! The merged list is persisted as a [`BlocklistSnapshot`] and held in memory
//! for a configurable TTL. When no snapshot exists yet, the first lookup
//! fetches every source before answering.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use moka::future::Cache;
use tracing::{debug, info, warn};

use crate::domain::blocklist::{
    merge_domain_lists, BlocklistSnapshot, BlocklistSource, DomainListService, BLOCKLIST_KEY,
};
use crate::domain::{Clock, DomainError, KeyValueStore, KeyValueStoreExt};
use crate::infrastructure::observability::record_blocklist_refresh;

/// Default lifetime of the in-memory copy
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

type DomainSet = Arc<HashSet<String>>;

/// Blocklist merged from several sources
#[derive(Debug)]
pub struct DomainList {
    sources: Vec<Arc<dyn BlocklistSource>>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    cache: Cache<(), DomainSet>,
}

impl DomainList {
    pub fn new(
        sources: Vec<Arc<dyn BlocklistSource>>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_cache_ttl(sources, store, clock, DEFAULT_CACHE_TTL)
    }

    pub fn with_cache_ttl(
        sources: Vec<Arc<dyn BlocklistSource>>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        let cache = Cache::builder().time_to_live(ttl).max_capacity(1).build();

        Self {
            sources,
            store,
            clock,
            cache,
        }
    }

    /// Drops the in-memory copy
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }

    /// Current domain set, loading or fetching it when the cache is cold
    ///
    /// Concurrent callers on a cold cache share a single load.
    pub async fn domains(&self) -> Result<DomainSet, DomainError> {
        self.cache
            .try_get_with((), self.load_domains())
            .await
            .map_err(Arc::unwrap_or_clone)
    }

    async fn load_domains(&self) -> Result<DomainSet, DomainError> {
        let snapshot = match self.load_snapshot().await? {
            Some(snapshot) => snapshot,
            None => {
                info!("No stored blocklist, fetching from sources");
                let result = self.fetch_and_store().await;
                record_blocklist_refresh(result.as_ref().copied().map_err(|_| ()));
                result?;
                self.load_snapshot().await?.ok_or_else(|| {
                    DomainError::storage("Blocklist missing right after refresh")
                })?
            }
        };

        let domains: DomainSet = Arc::new(snapshot.domains.into_iter().collect());
        debug!("Loaded {} blocklisted domains", domains.len());

        Ok(domains)
    }

    async fn load_snapshot(&self) -> Result<Option<BlocklistSnapshot>, DomainError> {
        self.store.get_json(BLOCKLIST_KEY).await
    }

    async fn fetch_all(&self) -> Vec<Vec<String>> {
        let fetches = self.sources.iter().map(|source| async move {
            match source.fetch().await {
                Ok(domains) => {
                    debug!("Fetched {} domains from {}", domains.len(), source.name());
                    domains
                }
                Err(e) => {
                    warn!("Blocklist source {} failed: {}", source.name(), e);
                    Vec::new()
                }
            }
        });

        join_all(fetches).await
    }

    async fn fetch_and_store(&self) -> Result<usize, DomainError> {
        let domains = merge_domain_lists(self.fetch_all().await);
        if domains.is_empty() {
            return Err(DomainError::provider("blocklist", "Failed to fetch any domains"));
        }

        let snapshot = BlocklistSnapshot::new(domains, self.clock.now());
        let count = snapshot.count;
        self.store.put_json(BLOCKLIST_KEY, &snapshot).await?;

        Ok(count)
    }
}

#[async_trait]
impl DomainListService for DomainList {
    async fn is_disposable(&self, domain: &str) -> Result<bool, DomainError> {
        Ok(self.domains().await?.contains(domain))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.domains().await?.len())
    }

    async fn refresh(&self) -> Result<usize, DomainError> {
        let result = self.fetch_and_store().await;
        if result.is_ok() {
            self.invalidate();
        }
        record_blocklist_refresh(result.as_ref().copied().map_err(|_| ()));

        match &result {
            Ok(count) => info!("Updated domain list: {} domains", count),
            Err(e) => warn!("Domain list update failed: {}", e),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::blocklist::mock::StaticBlocklistSource;
    use crate::domain::clock::mock::ManualClock;
    use crate::domain::storage::mock::MockKeyValueStore;
    use serde_json::json;

    fn list_with(
        sources: Vec<Arc<StaticBlocklistSource>>,
        store: Arc<MockKeyValueStore>,
    ) -> DomainList {
        let sources = sources
            .into_iter()
            .map(|s| s as Arc<dyn BlocklistSource>)
            .collect();
        DomainList::new(sources, store, Arc::new(ManualClock::fixed()))
    }

    #[tokio::test]
    async fn test_refresh_merges_sources() {
        let store = Arc::new(MockKeyValueStore::new());
        let list = list_with(
            vec![
                Arc::new(StaticBlocklistSource::new("a", &["b.com", "a.com"])),
                Arc::new(StaticBlocklistSource::failing("b")),
                Arc::new(StaticBlocklistSource::new("c", &["a.com", "c.com"])),
            ],
            store.clone(),
        );

        assert_eq!(list.refresh().await.unwrap(), 3);

        let stored = &store.snapshot()[BLOCKLIST_KEY];
        assert_eq!(stored["domains"], json!(["a.com", "b.com", "c.com"]));
        assert_eq!(stored["count"], json!(3));
    }

    #[tokio::test]
    async fn test_refresh_with_no_domains_fails() {
        let store = Arc::new(MockKeyValueStore::new());
        let list = list_with(
            vec![
                Arc::new(StaticBlocklistSource::failing("a")),
                Arc::new(StaticBlocklistSource::new("b", &[])),
            ],
            store.clone(),
        );

        assert!(list.refresh().await.is_err());
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_first_lookup_fetches_when_nothing_stored() {
        let source = Arc::new(StaticBlocklistSource::new("a", &["tempmail.io"]));
        let list = list_with(vec![source.clone()], Arc::new(MockKeyValueStore::new()));

        assert!(list.is_disposable("tempmail.io").await.unwrap());
        assert!(!list.is_disposable("gmail.com").await.unwrap());
        assert_eq!(list.count().await.unwrap(), 1);
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_cold_lookups_share_one_fetch() {
        let store = Arc::new(MockKeyValueStore::new());
        let source = Arc::new(StaticBlocklistSource::new("a", &["tempmail.io"]));
        let list = list_with(vec![source.clone()], store.clone());

        let lookups = (0..10).map(|_| list.is_disposable("tempmail.io"));
        let results = join_all(lookups).await;

        assert!(results.into_iter().all(|r| r.unwrap()));
        assert_eq!(source.fetches(), 1);
        assert_eq!(store.commits(), 1);
    }

    #[tokio::test]
    async fn test_cold_lookup_failure_is_not_cached() {
        let store = Arc::new(MockKeyValueStore::new());
        let list = list_with(
            vec![Arc::new(StaticBlocklistSource::failing("a"))],
            store.clone(),
        );

        let err = list.is_disposable("tempmail.io").await.unwrap_err();
        assert!(matches!(err, DomainError::Provider { .. }));
        assert!(list.is_disposable("tempmail.io").await.is_err());
    }

    #[tokio::test]
    async fn test_lookup_uses_stored_snapshot() {
        let store = Arc::new(MockKeyValueStore::new().with_entry(
            BLOCKLIST_KEY,
            json!({
                "domains": ["stored.com"],
                "count": 1,
                "updated_at": "2026-03-14T00:00:00Z"
            }),
        ));
        let source = Arc::new(StaticBlocklistSource::new("a", &["fresh.com"]));
        let list = list_with(vec![source.clone()], store);

        assert!(list.is_disposable("stored.com").await.unwrap());
        assert_eq!(source.fetches(), 0);
    }

    #[tokio::test]
    async fn test_cache_serves_until_invalidated() {
        let store = Arc::new(MockKeyValueStore::new());
        let list = list_with(
            vec![Arc::new(StaticBlocklistSource::new("a", &["one.com"]))],
            store.clone(),
        );
        assert_eq!(list.count().await.unwrap(), 1);

        // Reads come from memory while the cache is warm
        store.set_fail_reads(true);
        assert!(list.is_disposable("one.com").await.unwrap());

        list.invalidate();
        assert!(list.is_disposable("one.com").await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_replaces_cached_set() {
        let store = Arc::new(MockKeyValueStore::new().with_entry(
            BLOCKLIST_KEY,
            json!({
                "domains": ["old.com"],
                "count": 1,
                "updated_at": "2026-03-14T00:00:00Z"
            }),
        ));
        let list = list_with(
            vec![Arc::new(StaticBlocklistSource::new("a", &["new.com"]))],
            store,
        );
        assert!(list.is_disposable("old.com").await.unwrap());

        list.refresh().await.unwrap();

        assert!(!list.is_disposable("old.com").await.unwrap());
        assert!(list.is_disposable("new.com").await.unwrap());
    }
}
