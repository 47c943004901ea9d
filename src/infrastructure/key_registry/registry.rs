//! Key registry state machine
//!
//! Owns per-email key records, the api key index, the global counters and
//! community domain reports. Every mutation stages all of its writes in one
//! [`WriteBatch`], so a failed commit leaves the store untouched.
//!
//! `KeyRegistry` is not synchronised on its own. Run it behind
//! [`KeyRegistryHandle`](super::KeyRegistryHandle) so operations never
//! interleave.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::domain::key_registry::keys;
use crate::domain::key_registry::{
    AccountFilter, AccountInfo, AccountPage, CreatedKey, DomainReport, GlobalStats, KeyInfo,
    KeyRecord, LimitChange, RegistryLimits, RejectionReason, ValidationOutcome,
};
use crate::domain::{Clock, DomainError, KeyValueStore, KeyValueStoreExt, WriteBatch};

use super::generator::ApiKeyGenerator;

/// Key registry over a key-value store
#[derive(Debug)]
pub struct KeyRegistry {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    generator: ApiKeyGenerator,
    limits: RegistryLimits,
}

impl KeyRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            generator: ApiKeyGenerator::production(),
            limits: RegistryLimits::default(),
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Create with custom quota limits
    pub fn with_limits(mut self, limits: RegistryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &RegistryLimits {
        &self.limits
    }

    async fn load_record(&self, email: &str) -> Result<Option<KeyRecord>, DomainError> {
        self.store.get_json(&keys::record(email)).await
    }

    async fn counter(&self, key: &str) -> Result<u64, DomainError> {
        Ok(self.store.get_json::<u64>(key).await?.unwrap_or(0))
    }

    /// Stages a record together with its index entry
    fn stage_record(batch: &mut WriteBatch, record: &KeyRecord) -> Result<(), DomainError> {
        batch.put_json(keys::record(record.email()), record)?;
        batch.put_json(keys::lookup(record.api_key()), record.email())?;
        Ok(())
    }

    /// Returns the key for `email`, creating the record on first use
    pub async fn create_key(&self, email: &str) -> Result<CreatedKey, DomainError> {
        if let Some(existing) = self.load_record(email).await? {
            debug!("Key already exists for {}", email);
            return Ok(CreatedKey {
                api_key: existing.api_key().to_string(),
                is_new: false,
            });
        }

        let api_key = self.generator.generate();
        let record = KeyRecord::new(email, api_key.clone(), self.clock.now());

        let mut batch = WriteBatch::new();
        Self::stage_record(&mut batch, &record)?;
        self.store.commit(batch).await?;

        info!("API key created for {}", email);

        Ok(CreatedKey {
            api_key,
            is_new: true,
        })
    }

    /// Validates a key and counts the request against its daily quota
    pub async fn validate_and_increment(
        &self,
        api_key: &str,
    ) -> Result<ValidationOutcome, DomainError> {
        let Some(email) = self.store.get_json::<String>(&keys::lookup(api_key)).await? else {
            debug!("Rejected unknown API key");
            return Ok(ValidationOutcome::Rejected(RejectionReason::InvalidKey));
        };

        let mut record = match self.load_record(&email).await? {
            Some(record) if record.api_key() == api_key => record,
            Some(_) => {
                warn!(email = %email, "Index entry points at a record with a different key");
                return Ok(ValidationOutcome::Rejected(
                    RejectionReason::DataInconsistency,
                ));
            }
            None => {
                warn!(email = %email, "Index entry points at a missing record");
                return Ok(ValidationOutcome::Rejected(
                    RejectionReason::DataInconsistency,
                ));
            }
        };

        let today = self.clock.today();
        record.roll_over(today);

        let limit = record.effective_limit(&self.limits);
        let used = record.requests_on(today);
        if used >= limit {
            debug!(email = %email, limit, "Daily rate limit exceeded");
            return Ok(ValidationOutcome::Rejected(
                RejectionReason::RateLimitExceeded,
            ));
        }

        record.record_request();
        let checked = self.counter(keys::TOTAL_EMAILS_CHECKED).await? + 1;

        let mut batch = WriteBatch::new();
        Self::stage_record(&mut batch, &record)?;
        batch.put_json(keys::TOTAL_EMAILS_CHECKED, &checked)?;
        self.store.commit(batch).await?;

        Ok(ValidationOutcome::Valid {
            email,
            remaining: limit - used - 1,
        })
    }

    /// Usage view for `email`; a stale day reads as zero requests
    pub async fn get_key_info(&self, email: &str) -> Result<Option<KeyInfo>, DomainError> {
        let today = self.clock.today();
        Ok(self
            .load_record(email)
            .await?
            .map(|record| record.key_info(today, &self.limits)))
    }

    pub async fn increment_global_check_count(&self) -> Result<u64, DomainError> {
        let checked = self.counter(keys::TOTAL_EMAILS_CHECKED).await? + 1;
        self.store.put_json(keys::TOTAL_EMAILS_CHECKED, &checked).await?;
        Ok(checked)
    }

    pub async fn get_global_stats(&self) -> Result<GlobalStats, DomainError> {
        Ok(GlobalStats {
            total_emails_checked: self.counter(keys::TOTAL_EMAILS_CHECKED).await?,
            total_api_keys: self.store.count(keys::RECORD_PREFIX).await?,
        })
    }

    pub async fn get_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountInfo>, DomainError> {
        let today = self.clock.today();
        Ok(self
            .load_record(email)
            .await?
            .map(|record| record.account_info(today, &self.limits)))
    }

    /// Sets a daily limit override, clamped to `[0, max_daily_limit]`
    ///
    /// A limit equal to the default removes the override.
    pub async fn update_daily_limit(
        &self,
        email: &str,
        new_limit: i64,
    ) -> Result<Option<LimitChange>, DomainError> {
        let Some(mut record) = self.load_record(email).await? else {
            return Ok(None);
        };

        let previous_limit = record.effective_limit(&self.limits);
        let clamped = self.limits.clamp(new_limit);
        let custom = (clamped != self.limits.default_daily_limit).then_some(clamped);
        record.set_custom_daily_limit(custom);

        let mut batch = WriteBatch::new();
        Self::stage_record(&mut batch, &record)?;
        self.store.commit(batch).await?;

        info!(
            "Daily limit updated: email={}, previous={}, new={}",
            email, previous_limit, clamped
        );

        Ok(Some(LimitChange {
            previous_limit,
            new_limit: clamped,
        }))
    }

    /// Filters, sorts (newest first) and pages every account
    pub async fn list_accounts(&self, filter: AccountFilter) -> Result<AccountPage, DomainError> {
        let now = self.clock.now();
        let today = now.date_naive();
        // A window reaching past the earliest representable date keeps every record
        let cutoff = filter
            .registered_within_days
            .and_then(|days| Duration::try_days(i64::from(days)))
            .and_then(|window| now.checked_sub_signed(window));

        let mut records: Vec<KeyRecord> = self.store.list_json(keys::RECORD_PREFIX).await?;
        records.retain(|record| {
            cutoff.is_none_or(|cutoff| record.created_at() >= cutoff)
                && filter
                    .min_usage_count
                    .is_none_or(|min| record.total_usage() >= min)
        });
        records.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.email().cmp(b.email()))
        });

        let total_count = records.len();
        let accounts = records
            .iter()
            .skip(filter.offset)
            .take(filter.page_size())
            .map(|record| record.account_info(today, &self.limits))
            .collect();

        Ok(AccountPage {
            accounts,
            total_count,
        })
    }

    /// Records a community report for `domain`
    pub async fn report_domain(
        &self,
        domain: &str,
        reason: Option<String>,
    ) -> Result<DomainReport, DomainError> {
        let domain = domain.to_lowercase();
        let key = keys::report(&domain);
        let now = self.clock.now();

        let report = match self.store.get_json::<DomainReport>(&key).await? {
            Some(mut report) => {
                report.record(reason, now);
                report
            }
            None => DomainReport::new(domain.clone(), reason, now),
        };
        let reports = self.counter(keys::COMMUNITY_REPORTS).await? + 1;

        let mut batch = WriteBatch::new();
        batch.put_json(key, &report)?;
        batch.put_json(keys::COMMUNITY_REPORTS, &reports)?;
        self.store.commit(batch).await?;

        info!(domain = %domain, count = report.report_count(), "Domain reported");

        Ok(report)
    }

    /// Reports ordered by count, most reported first
    pub async fn list_reports(&self) -> Result<Vec<DomainReport>, DomainError> {
        let mut reports: Vec<DomainReport> = self.store.list_json(keys::REPORT_PREFIX).await?;
        reports.sort_by(|a, b| {
            b.report_count()
                .cmp(&a.report_count())
                .then_with(|| a.domain().cmp(b.domain()))
        });
        Ok(reports)
    }

    pub async fn community_report_count(&self) -> Result<u64, DomainError> {
        self.counter(keys::COMMUNITY_REPORTS).await
    }
}
