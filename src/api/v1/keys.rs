//! API key request and usage endpoints

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::email_domain;

#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "turnstileToken", alias = "turnstile_token")]
    pub turnstile_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateKeyResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyInfoResponse {
    pub exists: bool,
    pub requests_today: u64,
    pub daily_limit: u64,
    pub created_at: DateTime<Utc>,
}

/// POST /api/v1/keys
///
/// Issues a key for the email, or re-sends the existing one, after the
/// challenge passes and the address is not disposable.
pub async fn create_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateKeyRequest>,
) -> Result<Json<CreateKeyResponse>, ApiError> {
    let token = request
        .turnstile_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::turnstile_required("Turnstile verification required"))?;

    let verification = state
        .challenge_verifier
        .verify(&token, client_ip(&headers))
        .await;
    if !verification.success {
        warn!(error_codes = ?verification.error_codes, "Turnstile validation failed");
        return Err(ApiError::turnstile_failed("Turnstile verification failed"));
    }

    let email = request.email;
    let domain = email_domain(&email)?;
    if state.domain_list.is_disposable(&domain).await? {
        return Err(ApiError::disposable_email(
            "Cannot use disposable email for API key registration",
        ));
    }

    let created = state.key_registry.create_key(&email).await?;

    if let Err(e) = state.mailer.send_api_key(&email, &created.api_key).await {
        error!(error = %e, "Failed to send API key email");
        return Err(ApiError::email_failed("Failed to send email. Please try again."));
    }

    info!("API key delivered: is_new={}", created.is_new);

    let message = if created.is_new {
        "API key created and sent to your email"
    } else {
        "Your existing API key has been resent to your email"
    };

    Ok(Json(CreateKeyResponse {
        success: true,
        message: message.to_string(),
    }))
}

/// GET /api/v1/keys/{email}
pub async fn get_key_info(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<KeyInfoResponse>, ApiError> {
    let info = state
        .key_registry
        .get_key_info(&email)
        .await?
        .ok_or_else(|| ApiError::not_found("No API key found for this email"))?;

    Ok(Json(KeyInfoResponse {
        exists: true,
        requests_today: info.requests_today,
        daily_limit: info.daily_limit,
        created_at: info.created_at,
    }))
}

/// Caller address as reported by the edge proxy
fn client_ip(headers: &HeaderMap) -> Option<&str> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header("cf-connecting-ip").or_else(|| {
        header("x-forwarded-for")
            .and_then(|forwarded| forwarded.split(',').next())
            .map(str::trim)
    })
}
