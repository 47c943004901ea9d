use std::time::Duration;

use serde::Deserialize;

use crate::domain::key_registry::{RegistryLimits, DEFAULT_DAILY_LIMIT, MAX_DAILY_LIMIT};
use crate::domain::DomainError;
use crate::infrastructure::challenge::TURNSTILE_VERIFY_URL;
use crate::infrastructure::domain_list::{DEFAULT_SOURCES, DEFAULT_USER_AGENT};
use crate::infrastructure::key_registry::DEFAULT_QUEUE_CAPACITY;
use crate::infrastructure::mail::RESEND_API_URL;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::storage::{
    PostgresConfig, StorageConfig, StorageType, DEFAULT_TABLE_NAME,
};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub domains: DomainsConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub turnstile: TurnstileConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Key-value store backend selection
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_daily_limit")]
    pub default_daily_limit: u64,
    #[serde(default = "max_daily_limit")]
    pub max_daily_limit: u64,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

/// Disposable domain blocklist settings
#[derive(Debug, Clone, Deserialize)]
pub struct DomainsConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Browser origins allowed by CORS and trusted for anonymous checks
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Admin endpoints reject every request while unset
    #[serde(default)]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TurnstileConfig {
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default = "default_verify_url")]
    pub verify_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub resend_api_key: Option<String>,
    #[serde(default = "default_mail_from")]
    pub from: String,
    #[serde(default = "default_mail_api_url")]
    pub api_url: String,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_table() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_daily_limit() -> u64 {
    DEFAULT_DAILY_LIMIT
}

fn max_daily_limit() -> u64 {
    MAX_DAILY_LIMIT
}

fn default_key_prefix() -> String {
    "dk_live_".to_string()
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_sources() -> Vec<String> {
    DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_refresh_interval_secs() -> u64 {
    86_400
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:8787".to_string(),
    ]
}

fn default_verify_url() -> String {
    TURNSTILE_VERIFY_URL.to_string()
}

fn default_mail_from() -> String {
    "DisposableCheck <noreply@localhost>".to_string()
}

fn default_mail_api_url() -> String {
    RESEND_API_URL.to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_url: None,
            table: default_table(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_daily_limit: default_daily_limit(),
            max_daily_limit: max_daily_limit(),
            key_prefix: default_key_prefix(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for DomainsConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            cache_ttl_secs: default_cache_ttl_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for TurnstileConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            verify_url: default_verify_url(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            from: default_mail_from(),
            api_url: default_mail_api_url(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl StorageSettings {
    /// Resolves the backend settings into a factory configuration
    pub fn to_storage_config(&self) -> Result<StorageConfig, DomainError> {
        match self.backend.parse::<StorageType>()? {
            StorageType::InMemory => Ok(StorageConfig::in_memory()),
            StorageType::Postgres => {
                let url = self.database_url.as_deref().ok_or_else(|| {
                    DomainError::configuration("storage.database_url is required for postgres")
                })?;

                Ok(StorageConfig::Postgres {
                    config: PostgresConfig::new(url).with_max_connections(self.max_connections),
                    table_name: self.table.clone(),
                })
            }
        }
    }
}

impl RegistryConfig {
    pub fn limits(&self) -> Result<RegistryLimits, DomainError> {
        RegistryLimits::new(self.default_daily_limit, self.max_daily_limit)
    }
}

impl DomainsConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Treats empty strings from the environment as unset
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl AdminConfig {
    pub fn secret(&self) -> Option<&str> {
        non_empty(&self.secret)
    }
}

impl TurnstileConfig {
    pub fn secret_key(&self) -> Option<&str> {
        non_empty(&self.secret_key)
    }
}

impl MailConfig {
    pub fn resend_api_key(&self) -> Option<&str> {
        non_empty(&self.resend_api_key)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .with_list_parse_key("domains.sources")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Checks settings that deserialization cannot express
    pub fn validate(&self) -> Result<(), DomainError> {
        self.registry.limits()?;
        self.storage.to_storage_config()?;

        if self.domains.sources.is_empty() {
            return Err(DomainError::configuration("domains.sources must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn parse(toml: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.registry.default_daily_limit, 1000);
        assert_eq!(config.registry.max_daily_limit, 1_000_000);
        assert_eq!(config.domains.sources.len(), 3);
        assert_eq!(config.domains.cache_ttl(), Duration::from_secs(300));
        assert!(config.admin.secret().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [logging]
            level = "debug"
            format = "json"

            [admin]
            secret = "s3cret"
            "#,
        );

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.admin.secret(), Some("s3cret"));
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.cors.allowed_origins.len(), 2);
    }

    #[test]
    fn test_blank_secrets_are_unset() {
        let config = parse(
            r#"
            [turnstile]
            secret_key = "  "

            [mail]
            resend_api_key = ""
            "#,
        );

        assert!(config.turnstile.secret_key().is_none());
        assert!(config.mail.resend_api_key().is_none());
    }

    #[test]
    fn test_postgres_requires_url() {
        let mut settings = StorageSettings {
            backend: "postgres".to_string(),
            ..StorageSettings::default()
        };
        assert!(settings.to_storage_config().is_err());

        settings.database_url = Some("postgres://localhost/dc".to_string());
        let resolved = settings.to_storage_config().unwrap();
        assert_eq!(resolved.storage_type(), StorageType::Postgres);
    }

    #[test]
    fn test_invalid_limits_fail_validation() {
        let mut config = AppConfig::default();
        config.registry.default_daily_limit = 2_000_000;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_backend_fails_validation() {
        let mut config = AppConfig::default();
        config.storage.backend = "redis".to_string();

        assert!(config.validate().is_err());
    }
}
