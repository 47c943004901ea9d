//! Application state for shared services

use std::sync::Arc;

use crate::domain::{
    ChallengeVerifier, Clock, DomainListService, KeyMailer, KeyRegistryService, KeyValueStore,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub key_registry: Arc<dyn KeyRegistryService>,
    pub domain_list: Arc<dyn DomainListService>,
    pub challenge_verifier: Arc<dyn ChallengeVerifier>,
    pub mailer: Arc<dyn KeyMailer>,
    /// Backing store, pinged by the readiness check
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    /// `None` disables the admin endpoints
    pub admin_secret: Option<Arc<str>>,
    /// Origins allowed by CORS and trusted for keyless checks
    pub allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(
        key_registry: Arc<dyn KeyRegistryService>,
        domain_list: Arc<dyn DomainListService>,
        challenge_verifier: Arc<dyn ChallengeVerifier>,
        mailer: Arc<dyn KeyMailer>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            key_registry,
            domain_list,
            challenge_verifier,
            mailer,
            store,
            clock,
            admin_secret: None,
            allowed_origins: Arc::new(Vec::new()),
        }
    }

    pub fn with_admin_secret(mut self, secret: Option<&str>) -> Self {
        self.admin_secret = secret
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Arc::from);
        self
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = Arc::new(origins);
        self
    }

    /// True when `origin` exactly matches a configured origin
    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    /// True when `referer` starts with a configured origin
    pub fn is_allowed_referer(&self, referer: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| referer.starts_with(allowed.as_str()))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("key_registry", &self.key_registry)
            .field("domain_list", &self.domain_list)
            .field("admin_secret", &self.admin_secret.as_ref().map(|_| "[REDACTED]"))
            .field("allowed_origins", &self.allowed_origins)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::mock::*;

    #[tokio::test]
    async fn test_origin_matching() {
        let ctx = test_context();

        assert!(ctx.state.is_allowed_origin(TRUSTED_ORIGIN));
        assert!(!ctx.state.is_allowed_origin("https://evil.example.com"));
        assert!(ctx.state.is_allowed_referer(&format!("{}/docs", TRUSTED_ORIGIN)));
        assert!(!ctx.state.is_allowed_referer("https://evil.example.com/"));
    }

    #[tokio::test]
    async fn test_blank_admin_secret_disables_admin() {
        let ctx = test_context();
        let state = ctx.state.with_admin_secret(Some("   "));
        assert!(state.admin_secret.is_none());
    }

    #[tokio::test]
    async fn test_debug_redacts_secret() {
        let ctx = test_context();
        let debug = format!("{:?}", ctx.state);
        assert!(!debug.contains(ADMIN_SECRET));
        assert!(debug.contains("[REDACTED]"));
    }
}
