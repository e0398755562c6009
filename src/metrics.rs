/// Metrics and telemetry for the dating API
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - HTTP request counts and latencies
/// - Database query times
/// - Gallery operation outcomes
/// - Errors by type

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, Encoder, HistogramVec,
    IntCounterVec, IntGauge, TextEncoder,
};
use std::time::Instant;

lazy_static! {
    // ========== HTTP Metrics ==========

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request latencies in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    /// Active HTTP requests
    pub static ref HTTP_REQUESTS_ACTIVE: IntGauge = register_int_gauge!(
        "http_requests_active",
        "Number of HTTP requests currently being processed"
    )
    .unwrap();

    // ========== Database Metrics ==========

    /// Database query count by operation type
    pub static ref DB_QUERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "db_queries_total",
        "Total number of database queries",
        &["operation", "table"]
    )
    .unwrap();

    /// Database query duration in seconds
    pub static ref DB_QUERY_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "db_query_duration_seconds",
        "Database query latencies in seconds",
        &["operation", "table"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .unwrap();

    // ========== Gallery Metrics ==========

    /// Gallery operations by operation and outcome
    pub static ref GALLERY_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gallery_operations_total",
        "Total number of gallery operations",
        &["operation", "outcome"]
    )
    .unwrap();

    // ========== Error Metrics ==========

    /// Errors by type
    pub static ref ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "errors_total",
        "Total number of errors",
        &["error_type", "module"]
    )
    .unwrap();
}

/// Render all registered metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration);
}

/// Record a database query
pub fn record_db_query(operation: &str, table: &str, duration: f64) {
    DB_QUERIES_TOTAL
        .with_label_values(&[operation, table])
        .inc();
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation, table])
        .observe(duration);
}

/// Record the outcome of a gallery operation
pub fn record_gallery_operation(operation: &str, outcome: &str) {
    GALLERY_OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Record an error
pub fn record_error(error_type: &str, module: &str) {
    ERRORS_TOTAL
        .with_label_values(&[error_type, module])
        .inc();
}

/// Middleware recording request counts and latencies.
///
/// Uses the matched route template as the path label so ids in the URL do
/// not explode label cardinality.
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    HTTP_REQUESTS_ACTIVE.inc();
    let started = Instant::now();
    let response = next.run(request).await;
    HTTP_REQUESTS_ACTIVE.dec();

    let status = response.status();
    record_http_request(
        &method,
        &path,
        status.as_u16(),
        started.elapsed().as_secs_f64(),
    );
    if status.is_client_error() || status.is_server_error() {
        let module = if path.contains("/photos") { "gallery" } else { "api" };
        record_error(status.canonical_reason().unwrap_or("error"), module);
    }

    response
}
