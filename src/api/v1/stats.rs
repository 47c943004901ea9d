//! Public platform statistics

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_emails_checked: u64,
    pub total_disposable_domains: usize,
    pub community_reports: u64,
}

/// GET /api/v1/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.key_registry.get_global_stats().await?;
    let community_reports = state.key_registry.community_report_count().await?;

    // An unreachable blocklist should not take the stats page down
    let total_disposable_domains = state.domain_list.count().await.unwrap_or_else(|e| {
        warn!(error = %e, "Blocklist unavailable for stats");
        0
    });

    Ok(Json(StatsResponse {
        total_emails_checked: stats.total_emails_checked,
        total_disposable_domains,
        community_reports,
    }))
}
