//! Outbound API key delivery

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Sends a freshly issued or existing API key to its owner
#[async_trait]
pub trait KeyMailer: Send + Sync + Debug {
    async fn send_api_key(&self, to: &str, api_key: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Mailer that records deliveries
    #[derive(Debug, Default)]
    pub struct MockKeyMailer {
        sent: Mutex<Vec<(String, String)>>,
        should_fail: AtomicBool,
    }

    impl MockKeyMailer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_should_fail(&self, fail: bool) {
            self.should_fail.store(fail, Ordering::SeqCst);
        }

        /// Deliveries as `(to, api_key)` pairs
        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl KeyMailer for MockKeyMailer {
        async fn send_api_key(&self, to: &str, api_key: &str) -> Result<(), DomainError> {
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(DomainError::provider("mock", "Mock mailer configured to fail"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), api_key.to_string()));
            Ok(())
        }
    }
}
