//! Quota and pagination limits

use serde::Deserialize;

use crate::domain::DomainError;

/// Daily quota applied when a record has no override
pub const DEFAULT_DAILY_LIMIT: u64 = 1000;

/// Highest daily quota an admin can grant
pub const MAX_DAILY_LIMIT: u64 = 1_000_000;

/// Page size used when a listing does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Hard cap on listing page size
pub const MAX_PAGE_SIZE: usize = 1000;

/// Quota settings shared by every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RegistryLimits {
    #[serde(default = "default_daily_limit")]
    pub default_daily_limit: u64,
    #[serde(default = "max_daily_limit")]
    pub max_daily_limit: u64,
}

fn default_daily_limit() -> u64 {
    DEFAULT_DAILY_LIMIT
}

fn max_daily_limit() -> u64 {
    MAX_DAILY_LIMIT
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            default_daily_limit: DEFAULT_DAILY_LIMIT,
            max_daily_limit: MAX_DAILY_LIMIT,
        }
    }
}

impl RegistryLimits {
    pub fn new(default_daily_limit: u64, max_daily_limit: u64) -> Result<Self, DomainError> {
        let limits = Self {
            default_daily_limit,
            max_daily_limit,
        };
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.default_daily_limit > self.max_daily_limit {
            return Err(DomainError::configuration(format!(
                "default daily limit {} exceeds maximum {}",
                self.default_daily_limit, self.max_daily_limit
            )));
        }
        Ok(())
    }

    /// Clamps a requested limit into `[0, max_daily_limit]`
    pub fn clamp(&self, requested: i64) -> u64 {
        if requested <= 0 {
            0
        } else {
            (requested as u64).min(self.max_daily_limit)
        }
    }
}
