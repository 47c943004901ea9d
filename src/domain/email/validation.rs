//! Email and domain format validation

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Shortest domain a report may name
pub const MIN_DOMAIN_LENGTH: usize = 3;

/// Longest domain a report may name
pub const MAX_DOMAIN_LENGTH: usize = 253;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static DOMAIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([a-z0-9]+(-[a-z0-9]+)*\.)+[a-z]{2,}$").unwrap());

/// Format validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailValidationError {
    /// Email does not look like `local@domain.tld`
    InvalidEmail,
    /// Domain length outside the allowed range
    DomainLength { length: usize, min: usize, max: usize },
    /// Domain is not a dotted hostname
    InvalidDomain,
}

impl fmt::Display for EmailValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "Invalid email format"),
            Self::DomainLength { length, min, max } => write!(
                f,
                "Domain length {} is outside the allowed range {}-{}",
                length, min, max
            ),
            Self::InvalidDomain => write!(f, "Invalid domain format"),
        }
    }
}

impl std::error::Error for EmailValidationError {}

/// Validates an email and returns its lower-cased domain
pub fn email_domain(email: &str) -> Result<String, EmailValidationError> {
    if !EMAIL_PATTERN.is_match(email) {
        return Err(EmailValidationError::InvalidEmail);
    }

    email
        .split_once('@')
        .map(|(_, domain)| domain.to_lowercase())
        .ok_or(EmailValidationError::InvalidEmail)
}

/// Validates a reported domain and returns it lower-cased
pub fn normalize_domain(domain: &str) -> Result<String, EmailValidationError> {
    let length = domain.len();
    if !(MIN_DOMAIN_LENGTH..=MAX_DOMAIN_LENGTH).contains(&length) {
        return Err(EmailValidationError::DomainLength {
            length,
            min: MIN_DOMAIN_LENGTH,
            max: MAX_DOMAIN_LENGTH,
        });
    }

    if !DOMAIN_PATTERN.is_match(domain) {
        return Err(EmailValidationError::InvalidDomain);
    }

    Ok(domain.to_lowercase())
}
