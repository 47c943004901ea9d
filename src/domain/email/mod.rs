//! Email checking domain

mod validation;

pub use validation::{
    email_domain, normalize_domain, EmailValidationError, MAX_DOMAIN_LENGTH, MIN_DOMAIN_LENGTH,
};
