//! Metrics and observability utilities
//!
//! Prometheus metrics with standardized naming conventions.

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Artify metrics
pub const METRICS_PREFIX: &str = "artify";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_store_ops_total", METRICS_PREFIX),
        Unit::Count,
        "Total document store operations"
    );

    describe_histogram!(
        format!("{}_store_op_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Document store operation latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Record one completed HTTP request
pub fn record_request(method: &str, endpoint: &str, status: u16, duration_secs: f64) {
    counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string()
    )
    .record(duration_secs);
}

/// Middleware recording count and latency for every request.
///
/// Labels use the matched route template rather than the raw path to
/// keep label cardinality bounded.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let start = Instant::now();
    let response = next.run(req).await;

    record_request(
        &method,
        &endpoint,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

/// Record one document store round-trip
pub fn record_store_op(collection: &'static str, op: &'static str, duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_store_ops_total", METRICS_PREFIX),
        "collection" => collection,
        "op" => op,
        "status" => status
    )
    .increment(1);

    histogram!(
        format!("{}_store_op_duration_seconds", METRICS_PREFIX),
        "collection" => collection,
        "op" => op
    )
    .record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_store_op() {
        register_metrics();
        record_store_op("artworks", "find", 0.004, true);
        record_store_op("favorites", "insert_one", 0.002, false);
        // Just verify it runs without panic
    }

    #[test]
    fn test_record_request() {
        register_metrics();
        record_request("GET", "/artworks", 200, 0.012);
        record_request("POST", "/favorites", 409, 0.003);
        // Just verify it runs without panic
    }
}
