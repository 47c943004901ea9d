//! Account administration endpoints

use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::key_registry::{DEFAULT_PAGE_SIZE, MAX_DAILY_LIMIT, MAX_PAGE_SIZE};
use crate::domain::{AccountFilter, AccountInfo};

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub total_usage: u64,
    pub requests_today: u64,
    pub daily_limit: u64,
    pub custom_daily_limit: Option<u64>,
}

impl From<AccountInfo> for AccountResponse {
    fn from(account: AccountInfo) -> Self {
        Self {
            email: account.email,
            created_at: account.created_at,
            total_usage: account.total_usage,
            requests_today: account.requests_today,
            daily_limit: account.daily_limit,
            custom_daily_limit: account.custom_daily_limit,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateLimitResponse {
    pub success: bool,
    pub previous_limit: u64,
    pub new_limit: u64,
}

/// Raw query values; parsed by hand so bad input yields a JSON 400
#[derive(Debug, Default, Deserialize)]
pub struct ListAccountsParams {
    pub registered_within_days: Option<String>,
    pub min_usage_count: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountListResponse {
    pub accounts: Vec<AccountResponse>,
    pub total_count: usize,
    pub limit: usize,
    pub offset: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/admin/accounts/{email}
pub async fn get_account(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .key_registry
        .get_account_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::not_found("Account not found"))?;

    Ok(Json(account.into()))
}

/// PATCH /api/v1/admin/accounts/{email}/limit
pub async fn update_account_limit(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<UpdateLimitResponse>, ApiError> {
    let daily_limit = parse_daily_limit(&body)?;

    let change = state
        .key_registry
        .update_daily_limit(&email, daily_limit)
        .await?
        .ok_or_else(|| ApiError::not_found("Account not found"))?;

    info!(
        "Daily limit updated: previous={}, new={}",
        change.previous_limit, change.new_limit
    );

    Ok(Json(UpdateLimitResponse {
        success: true,
        previous_limit: change.previous_limit,
        new_limit: change.new_limit,
    }))
}

/// GET /api/v1/admin/accounts
pub async fn list_accounts(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListAccountsParams>,
) -> Result<Json<AccountListResponse>, ApiError> {
    let filter = build_filter(&params)?;
    let (limit, offset) = (filter.limit, filter.offset);

    let page = state.key_registry.list_accounts(filter).await?;

    Ok(Json(AccountListResponse {
        accounts: page.accounts.into_iter().map(Into::into).collect(),
        total_count: page.total_count,
        limit,
        offset,
    }))
}

// ============================================================================
// Validation
// ============================================================================

fn parse_daily_limit(body: &Value) -> Result<i64, ApiError> {
    let invalid = || ApiError::bad_request("daily_limit must be a number between 0 and 1,000,000");

    let limit = body
        .get("daily_limit")
        .and_then(Value::as_f64)
        .ok_or_else(invalid)?;

    if !(0.0..=MAX_DAILY_LIMIT as f64).contains(&limit) || limit.fract() != 0.0 {
        return Err(invalid());
    }

    Ok(limit as i64)
}

fn build_filter(params: &ListAccountsParams) -> Result<AccountFilter, ApiError> {
    let mut filter = AccountFilter::default();

    if let Some(raw) = &params.registered_within_days {
        let days = parse_non_negative(raw, "registered_within_days")?;
        let days = u32::try_from(days).map_err(|_| {
            ApiError::bad_request("registered_within_days must be a non-negative integer")
        })?;
        filter = filter.registered_within_days(days);
    }

    if let Some(raw) = &params.min_usage_count {
        filter = filter.min_usage_count(parse_non_negative(raw, "min_usage_count")?);
    }

    let limit = match &params.limit {
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(limit) if (1..=MAX_PAGE_SIZE).contains(&limit) => limit,
            _ => {
                return Err(ApiError::bad_request(format!(
                    "limit must be between 1 and {}",
                    MAX_PAGE_SIZE
                )))
            }
        },
        None => DEFAULT_PAGE_SIZE,
    };

    let offset = match &params.offset {
        Some(raw) => usize::try_from(parse_non_negative(raw, "offset")?)
            .map_err(|_| ApiError::bad_request("offset must be a non-negative integer"))?,
        None => 0,
    };

    Ok(filter.page(limit, offset))
}

fn parse_non_negative(raw: &str, name: &str) -> Result<u64, ApiError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ApiError::bad_request(format!("{} must be a non-negative integer", name)))
}
