//! Request and result types for key registry operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Result of `create_key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedKey {
    pub api_key: String,
    /// False when the email already had a key
    pub is_new: bool,
}

/// Why a presented key was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// No index entry for the key
    InvalidKey,
    /// Index entry points at a missing or mismatched record
    DataInconsistency,
    /// Effective daily quota already used up
    RateLimitExceeded,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidKey => "invalid_key",
            Self::DataInconsistency => "data_inconsistency",
            Self::RateLimitExceeded => "rate_limit_exceeded",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey => write!(f, "Invalid API key"),
            Self::DataInconsistency => write!(f, "Key data not found"),
            Self::RateLimitExceeded => write!(f, "Daily rate limit exceeded"),
        }
    }
}

/// Result of `validate_and_increment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid { email: String, remaining: u64 },
    Rejected(RejectionReason),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Valid { email, .. } => Some(email),
            Self::Rejected(_) => None,
        }
    }

    /// Remaining quota; zero when rate limited, absent for unknown keys
    pub fn remaining(&self) -> Option<u64> {
        match self {
            Self::Valid { remaining, .. } => Some(*remaining),
            Self::Rejected(RejectionReason::RateLimitExceeded) => Some(0),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            Self::Valid { .. } => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}

/// Public usage view of a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub requests_today: u64,
    pub daily_limit: u64,
    pub created_at: DateTime<Utc>,
}

/// Admin view of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub total_usage: u64,
    pub requests_today: u64,
    pub daily_limit: u64,
    pub custom_daily_limit: Option<u64>,
}

/// Result of an admin limit update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitChange {
    pub previous_limit: u64,
    pub new_limit: u64,
}

/// Filters and pagination for account listings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountFilter {
    #[serde(default)]
    pub registered_within_days: Option<u32>,
    #[serde(default)]
    pub min_usage_count: Option<u64>,
    #[serde(default = "default_page_size")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for AccountFilter {
    fn default() -> Self {
        Self {
            registered_within_days: None,
            min_usage_count: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl AccountFilter {
    pub fn registered_within_days(mut self, days: u32) -> Self {
        self.registered_within_days = Some(days);
        self
    }

    pub fn min_usage_count(mut self, count: u64) -> Self {
        self.min_usage_count = Some(count);
        self
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Requested page size capped at [`MAX_PAGE_SIZE`]
    pub fn page_size(&self) -> usize {
        self.limit.min(MAX_PAGE_SIZE)
    }
}

/// One page of accounts plus the filtered total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPage {
    pub accounts: Vec<AccountInfo>,
    pub total_count: usize,
}

/// Aggregate counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalStats {
    pub total_emails_checked: u64,
    pub total_api_keys: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_remaining() {
        let valid = ValidationOutcome::Valid {
            email: "a@x.com".to_string(),
            remaining: 4,
        };
        assert!(valid.is_valid());
        assert_eq!(valid.remaining(), Some(4));
        assert_eq!(valid.email(), Some("a@x.com"));

        let limited = ValidationOutcome::Rejected(RejectionReason::RateLimitExceeded);
        assert!(!limited.is_valid());
        assert_eq!(limited.remaining(), Some(0));

        let invalid = ValidationOutcome::Rejected(RejectionReason::InvalidKey);
        assert_eq!(invalid.remaining(), None);
        assert_eq!(invalid.rejection(), Some(RejectionReason::InvalidKey));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(RejectionReason::InvalidKey.to_string(), "Invalid API key");
        assert_eq!(
            RejectionReason::RateLimitExceeded.to_string(),
            "Daily rate limit exceeded"
        );
    }

    #[test]
    fn test_page_size_is_capped() {
        assert_eq!(AccountFilter::default().page_size(), 100);
        assert_eq!(AccountFilter::default().page(5000, 0).page_size(), 1000);
        assert_eq!(AccountFilter::default().page(50, 100).page_size(), 50);
    }
}
