use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::admin;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware, ADMIN_SECRET_HEADER};
use super::state::AppState;
use super::v1;

const CORS_MAX_AGE: Duration = Duration::from_secs(86400);

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Public API
        .nest("/api/v1", v1::create_v1_router())
        // Admin API
        .nest("/api/v1/admin", admin::create_admin_router())
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS policy for the configured website origins
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static(ADMIN_SECRET_HEADER),
        ])
        .max_age(CORS_MAX_AGE)
}
