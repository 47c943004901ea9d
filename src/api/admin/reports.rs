//! Community report review

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::DomainReport;

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub domain: String,
    pub report_count: u64,
    pub first_reported_at: DateTime<Utc>,
    pub last_reported_at: DateTime<Utc>,
    pub reasons: Vec<String>,
}

impl From<DomainReport> for ReportResponse {
    fn from(report: DomainReport) -> Self {
        Self {
            domain: report.domain().to_string(),
            report_count: report.report_count(),
            first_reported_at: report.first_reported_at(),
            last_reported_at: report.last_reported_at(),
            reasons: report.reasons().to_vec(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportListResponse {
    pub reports: Vec<ReportResponse>,
    pub total_count: usize,
}

/// GET /api/v1/admin/reports
///
/// Most reported domains first.
pub async fn list_reports(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ReportListResponse>, ApiError> {
    let reports: Vec<ReportResponse> = state
        .key_registry
        .list_reports()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ReportListResponse {
        total_count: reports.len(),
        reports,
    }))
}
