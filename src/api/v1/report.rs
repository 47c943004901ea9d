//! Community domain reports

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::normalize_domain;

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub domain: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/v1/report
pub async fn report_domain(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    let domain = normalize_domain(&request.domain)?;
    let reason = request
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let report = state.key_registry.report_domain(&domain, reason).await?;
    info!("Domain reported: domain={}, count={}", report.domain(), report.report_count());

    Ok(Json(ReportResponse {
        success: true,
        message: "Domain reported successfully. Thank you for your contribution.".to_string(),
    }))
}
