//! DisposableCheck API
//!
//! Checks whether an email address belongs to a disposable-email provider:
//! - Per-email API keys with daily quotas, served by a single-writer registry
//! - Disposable domain blocklist merged from public sources
//! - Turnstile-protected key requests delivered over Resend
//! - Admin endpoints for accounts, limits and community reports

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{
    BlocklistSource, ChallengeVerifier, Clock, DomainListService, KeyMailer, KeyValueStore,
    SystemClock,
};
use infrastructure::{
    challenge::{PermissiveVerifier, TurnstileVerifier},
    domain_list::{build_http_client, DomainList, HttpBlocklistSource},
    key_registry::{ApiKeyGenerator, KeyRegistry, KeyRegistryHandle},
    mail::{LogMailer, ResendMailer},
    storage::StorageFactory,
};
use tracing::{info, warn};

/// Create the application state with all services initialized
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = StorageFactory::create(&config.storage.to_storage_config()?).await?;
    let http = build_http_client(&config.domains.user_agent, config.domains.request_timeout())?;

    let limits = config.registry.limits()?;
    let registry = KeyRegistry::new(store.clone(), clock.clone())
        .with_generator(ApiKeyGenerator::new(config.registry.key_prefix.as_str()))
        .with_limits(limits);
    let (key_registry, _task) = KeyRegistryHandle::spawn(registry, config.registry.queue_capacity);
    info!(
        "Key registry started: default_daily_limit={}, queue_capacity={}",
        limits.default_daily_limit, config.registry.queue_capacity
    );

    let domain_list = create_domain_list(config, store.clone(), clock.clone(), http.clone());

    let challenge_verifier: Arc<dyn ChallengeVerifier> = match config.turnstile.secret_key() {
        Some(secret) => Arc::new(
            TurnstileVerifier::new(http.clone(), secret)
                .with_verify_url(config.turnstile.verify_url.as_str()),
        ),
        None => {
            warn!("No Turnstile secret configured, challenge tokens are not verified");
            Arc::new(PermissiveVerifier)
        }
    };

    let mailer: Arc<dyn KeyMailer> = match config.mail.resend_api_key() {
        Some(api_key) => Arc::new(
            ResendMailer::new(
                http.clone(),
                api_key,
                config.mail.from.as_str(),
                config.mail.public_base_url.as_str(),
            )
            .with_api_url(config.mail.api_url.as_str())
            .with_daily_limit(limits.default_daily_limit),
        ),
        None => {
            warn!("No Resend API key configured, API keys are logged instead of mailed");
            Arc::new(LogMailer)
        }
    };

    if config.admin.secret().is_none() {
        warn!("No admin secret configured, admin endpoints are disabled");
    }

    Ok(AppState::new(
        Arc::new(key_registry),
        domain_list,
        challenge_verifier,
        mailer,
        store,
        clock,
    )
    .with_admin_secret(config.admin.secret())
    .with_allowed_origins(config.cors.allowed_origins.clone()))
}

/// Create the blocklist service over the configured HTTP sources
pub fn create_domain_list(
    config: &AppConfig,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    http: reqwest::Client,
) -> Arc<dyn DomainListService> {
    let sources: Vec<Arc<dyn BlocklistSource>> = config
        .domains
        .sources
        .iter()
        .map(|url| {
            let source = HttpBlocklistSource::new(url.as_str(), http.clone());
            Arc::new(source) as Arc<dyn BlocklistSource>
        })
        .collect();

    info!("Blocklist sources: {}", sources.len());

    Arc::new(DomainList::with_cache_ttl(
        sources,
        store,
        clock,
        config.domains.cache_ttl(),
    ))
}
