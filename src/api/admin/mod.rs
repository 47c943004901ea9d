//! Admin API endpoints, guarded by the `X-Admin-Secret` header

pub mod accounts;
pub mod domains;
pub mod reports;

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(accounts::list_accounts))
        .route("/accounts/{email}", get(accounts::get_account))
        .route("/accounts/{email}/limit", patch(accounts::update_account_limit))
        .route("/domains/update", post(domains::update_domains))
        .route("/reports", get(reports::list_reports))
}
