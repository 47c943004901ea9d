//! Key record and domain report entities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::limits::RegistryLimits;
use super::types::{AccountInfo, KeyInfo};

/// Persisted per-email key state
///
/// `requests_today` only counts requests made on `last_reset_date`. Readers
/// must go through [`KeyRecord::requests_on`] so a stale date reads as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    email: String,
    api_key: String,
    created_at: DateTime<Utc>,
    requests_today: u64,
    last_reset_date: NaiveDate,
    #[serde(default)]
    total_usage: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_daily_limit: Option<u64>,
}

impl KeyRecord {
    /// Creates a fresh record with zeroed counters
    pub fn new(email: impl Into<String>, api_key: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            api_key: api_key.into(),
            created_at: now,
            requests_today: 0,
            last_reset_date: now.date_naive(),
            total_usage: 0,
            custom_daily_limit: None,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_reset_date(&self) -> NaiveDate {
        self.last_reset_date
    }

    pub fn total_usage(&self) -> u64 {
        self.total_usage
    }

    pub fn custom_daily_limit(&self) -> Option<u64> {
        self.custom_daily_limit
    }

    /// Requests counted against `today`, without mutating the record
    pub fn requests_on(&self, today: NaiveDate) -> u64 {
        if self.last_reset_date == today {
            self.requests_today
        } else {
            0
        }
    }

    /// Zeroes the daily counter if it belongs to another day
    ///
    /// Returns true when a reset happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == today {
            return false;
        }

        self.requests_today = 0;
        self.last_reset_date = today;
        true
    }

    /// Override if present and within bounds, otherwise the default
    pub fn effective_limit(&self, limits: &RegistryLimits) -> u64 {
        match self.custom_daily_limit {
            Some(limit) if limit <= limits.max_daily_limit => limit,
            _ => limits.default_daily_limit,
        }
    }

    /// Counts one accepted request
    ///
    /// Callers must have rolled the record over to today first.
    pub fn record_request(&mut self) {
        self.requests_today += 1;
        self.total_usage += 1;
    }

    pub fn set_custom_daily_limit(&mut self, limit: Option<u64>) {
        self.custom_daily_limit = limit;
    }

    pub fn key_info(&self, today: NaiveDate, limits: &RegistryLimits) -> KeyInfo {
        KeyInfo {
            requests_today: self.requests_on(today),
            daily_limit: self.effective_limit(limits),
            created_at: self.created_at,
        }
    }

    pub fn account_info(&self, today: NaiveDate, limits: &RegistryLimits) -> AccountInfo {
        AccountInfo {
            email: self.email.clone(),
            created_at: self.created_at,
            total_usage: self.total_usage,
            requests_today: self.requests_on(today),
            daily_limit: self.effective_limit(limits),
            custom_daily_limit: self.custom_daily_limit,
        }
    }
}

/// Maximum number of reasons kept on a report
pub const MAX_REPORT_REASONS: usize = 10;

/// Community report that a domain should be treated as disposable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainReport {
    domain: String,
    report_count: u64,
    first_reported_at: DateTime<Utc>,
    last_reported_at: DateTime<Utc>,
    #[serde(default)]
    reasons: Vec<String>,
}

impl DomainReport {
    pub fn new(domain: impl Into<String>, reason: Option<String>, now: DateTime<Utc>) -> Self {
        let mut report = Self {
            domain: domain.into(),
            report_count: 0,
            first_reported_at: now,
            last_reported_at: now,
            reasons: Vec::new(),
        };
        report.record(reason, now);
        report
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn report_count(&self) -> u64 {
        self.report_count
    }

    pub fn first_reported_at(&self) -> DateTime<Utc> {
        self.first_reported_at
    }

    pub fn last_reported_at(&self) -> DateTime<Utc> {
        self.last_reported_at
    }

    /// Most recent first
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// Counts another report
    pub fn record(&mut self, reason: Option<String>, now: DateTime<Utc>) {
        self.report_count += 1;
        self.last_reported_at = now;

        if let Some(reason) = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()) {
            self.reasons.insert(0, reason);
            self.reasons.truncate(MAX_REPORT_REASONS);
        }
    }
}
