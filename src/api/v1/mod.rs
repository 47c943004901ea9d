//! Public v1 API endpoints

pub mod check;
pub mod keys;
pub mod report;
pub mod stats;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/check", get(check::check_email))
        .route("/keys", post(keys::create_key))
        .route("/keys/{email}", get(keys::get_key_info))
        .route("/stats", get(stats::get_stats))
        .route("/report", post(report::report_domain))
}
