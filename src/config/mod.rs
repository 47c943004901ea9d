//! Application configuration

mod app_config;

pub use app_config::{
    AdminConfig, AppConfig, CorsConfig, DomainsConfig, LogFormat, LoggingConfig, MailConfig,
    RegistryConfig, ServerConfig, StorageSettings, TurnstileConfig,
};
