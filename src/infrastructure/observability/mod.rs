//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_blocklist_refresh, record_email_check,
    record_http_request, record_key_validation, PrometheusMetrics,
};
