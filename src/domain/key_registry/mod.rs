//! Key registry domain
//!
//! Types for per-email API keys, daily quotas, admin views and community
//! domain reports.

mod entity;
pub mod keys;
mod limits;
mod service;
mod types;

pub use entity::{DomainReport, KeyRecord, MAX_REPORT_REASONS};
pub use limits::{
    RegistryLimits, DEFAULT_DAILY_LIMIT, DEFAULT_PAGE_SIZE, MAX_DAILY_LIMIT, MAX_PAGE_SIZE,
};
pub use service::KeyRegistryService;
pub use types::{
    AccountFilter, AccountInfo, AccountPage, CreatedKey, GlobalStats, KeyInfo, LimitChange,
    RejectionReason, ValidationOutcome,
};
