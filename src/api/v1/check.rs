//! Email check endpoint

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::email_domain;
use crate::infrastructure::observability::{record_email_check, record_key_validation};

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmailCheckResponse {
    pub email: String,
    pub domain: String,
    pub is_disposable: bool,
    pub is_valid_format: bool,
    pub checked_at: DateTime<Utc>,
}

/// GET /api/v1/check?email=
///
/// Callers authenticate with `X-API-Key`, or come from a trusted website
/// origin. Either path counts towards the global check total.
pub async fn check_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CheckQuery>,
) -> Result<Json<EmailCheckResponse>, ApiError> {
    let email = query
        .email
        .filter(|email| !email.is_empty())
        .ok_or_else(|| ApiError::bad_request("email query parameter is required"))?;

    authorize(&state, &headers).await?;

    let domain = email_domain(&email)?;
    let is_disposable = state.domain_list.is_disposable(&domain).await?;
    record_email_check(is_disposable);

    debug!(domain = %domain, is_disposable, "Email checked");

    Ok(Json(EmailCheckResponse {
        email,
        domain,
        is_disposable,
        is_valid_format: true,
        checked_at: state.clock.now(),
    }))
}

async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    if let Some(api_key) = api_key {
        let outcome = state.key_registry.validate_and_increment(api_key).await?;
        record_key_validation(&outcome);

        return match outcome.rejection() {
            None => Ok(()),
            Some(reason) => Err(reason.into()),
        };
    }

    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let trusted_origin = header("origin").is_some_and(|o| state.is_allowed_origin(o));
    let trusted_referer = header("referer").is_some_and(|r| state.is_allowed_referer(r));

    if !trusted_origin && !trusted_referer {
        return Err(ApiError::unauthorized("Missing API key"));
    }

    state.key_registry.increment_global_check_count().await?;
    Ok(())
}
