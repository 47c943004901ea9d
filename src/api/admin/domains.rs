//! Blocklist administration

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateDomainsResponse {
    pub success: bool,
    pub count: usize,
    pub message: String,
}

/// POST /api/v1/admin/domains/update
pub async fn update_domains(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<UpdateDomainsResponse>, ApiError> {
    let count = state.domain_list.refresh().await.map_err(|e| {
        error!(error = %e, "Failed to update domain list");
        ApiError::internal("Failed to update domain list").with_details(e.to_string())
    })?;

    info!("Domain list updated on demand: count={}", count);

    Ok(Json(UpdateDomainsResponse {
        success: true,
        count,
        message: format!("Successfully updated domain list with {} domains", count),
    }))
}
