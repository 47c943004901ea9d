//! Domain layer - Core business logic and entities

pub mod blocklist;
pub mod challenge;
pub mod clock;
pub mod email;
pub mod error;
pub mod key_registry;
pub mod mail;
pub mod storage;

pub use blocklist::{BlocklistSnapshot, BlocklistSource, DomainListService};
pub use challenge::{ChallengeVerification, ChallengeVerifier};
pub use clock::{Clock, SystemClock};
pub use email::{email_domain, normalize_domain, EmailValidationError};
pub use error::DomainError;
pub use key_registry::{
    AccountFilter, AccountInfo, AccountPage, CreatedKey, DomainReport, GlobalStats, KeyInfo,
    KeyRecord, KeyRegistryService, LimitChange, RegistryLimits, RejectionReason,
    ValidationOutcome,
};
pub use mail::KeyMailer;
pub use storage::{KeyValueStore, KeyValueStoreExt, WriteBatch};
