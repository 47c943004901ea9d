//! Update-domains command - refreshes the stored blocklist once

use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::domain::SystemClock;
use crate::infrastructure::domain_list::build_http_client;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::StorageFactory;

/// Fetch every configured source and persist the merged list
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);
    config.validate()?;

    let store = StorageFactory::create(&config.storage.to_storage_config()?).await?;
    let http = build_http_client(&config.domains.user_agent, config.domains.request_timeout())?;
    let domain_list = crate::create_domain_list(&config, store, Arc::new(SystemClock), http);

    let count = domain_list.refresh().await?;
    info!("Stored {} disposable domains", count);

    Ok(())
}
