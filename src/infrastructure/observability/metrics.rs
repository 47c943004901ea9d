//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::ValidationOutcome;

use super::config::MetricsConfig;

static EMAIL_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/[^/\s]+@[^/\s]+").unwrap());

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
    path: String,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("disposable_check_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
                path: config.path.clone(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics) -> Router {
    let path = metrics.path().to_string();
    Router::new()
        .route(&path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record the outcome of an API key validation
pub fn record_key_validation(outcome: &ValidationOutcome) {
    let label = match outcome.rejection() {
        None => "valid",
        Some(reason) => reason.as_str(),
    };
    counter!("key_validations_total", "outcome" => label).increment(1);
}

/// Record a completed email check
pub fn record_email_check(disposable: bool) {
    counter!("email_checks_total", "disposable" => disposable.to_string()).increment(1);
}

/// Record a blocklist refresh attempt and, on success, the new list size
pub fn record_blocklist_refresh(result: Result<usize, ()>) {
    match result {
        Ok(count) => {
            counter!("blocklist_refresh_total", "status" => "success").increment(1);
            gauge!("blocklist_domains").set(count as f64);
        }
        Err(()) => {
            counter!("blocklist_refresh_total", "status" => "error").increment(1);
        }
    }
}

/// Sanitize URL path for metric labels (remove emails, limit cardinality)
fn sanitize_path(path: &str) -> String {
    let path = EMAIL_SEGMENT.replace_all(path, "/{email}");

    if path.len() > 50 {
        path.chars().take(50).collect()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RejectionReason;

    #[test]
    fn test_sanitize_path_email() {
        assert_eq!(sanitize_path("/api/v1/keys/a@x.com"), "/api/v1/keys/{email}");
        assert_eq!(
            sanitize_path("/api/v1/admin/accounts/a%2Bb@x.com/limit"),
            "/api/v1/admin/accounts/{email}/limit"
        );
    }

    #[test]
    fn test_sanitize_path_no_email() {
        assert_eq!(sanitize_path("/health"), "/health");
    }

    #[test]
    fn test_sanitize_path_truncates_long_paths() {
        let path = "/very/long/path/that/exceeds/the/maximum/allowed/length/for/metrics";
        assert!(sanitize_path(path).len() <= 50);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_http_request("GET", "/health", 200, Duration::from_millis(3));
        record_key_validation(&ValidationOutcome::Rejected(
            RejectionReason::RateLimitExceeded,
        ));
        record_email_check(true);
        record_blocklist_refresh(Ok(10));
        record_blocklist_refresh(Err(()));
    }
}
