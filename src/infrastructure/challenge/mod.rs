//! Bot challenge verifiers

mod turnstile;

pub use turnstile::{PermissiveVerifier, TurnstileVerifier, TURNSTILE_VERIFY_URL};
