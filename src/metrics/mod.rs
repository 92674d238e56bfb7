use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// Define metric names as constants to avoid typos
pub const CLIENT_REQUESTS_TOTAL: &str = "fmcd_dashboard_client_requests_total";
pub const CLIENT_RETRIES_TOTAL: &str = "fmcd_dashboard_client_retries_total";
pub const CLIENT_REQUEST_DURATION_SECONDS: &str = "fmcd_dashboard_client_request_duration_seconds";

pub const API_REQUESTS_TOTAL: &str = "fmcd_dashboard_api_requests_total";
pub const API_REQUEST_DURATION_SECONDS: &str = "fmcd_dashboard_api_request_duration_seconds";

pub const DEGRADED_FEDERATIONS_TOTAL: &str = "fmcd_dashboard_degraded_federations_total";

/// Register descriptions with whatever recorder is installed
pub fn describe_metrics() {
    describe_counter!(CLIENT_REQUESTS_TOTAL, "Total logical requests sent to the daemon");
    describe_counter!(CLIENT_RETRIES_TOTAL, "Total retried daemon request attempts");
    describe_histogram!(
        CLIENT_REQUEST_DURATION_SECONDS,
        "Daemon request duration in seconds, retries included"
    );
    describe_counter!(API_REQUESTS_TOTAL, "Total dashboard API requests");
    describe_histogram!(
        API_REQUEST_DURATION_SECONDS,
        "Dashboard API request duration in seconds"
    );
    describe_counter!(
        DEGRADED_FEDERATIONS_TOTAL,
        "Per-federation lookups that fell back to defaults"
    );
}

pub fn record_client_request(endpoint: &str, outcome: &str, duration: Duration) {
    counter!(
        CLIENT_REQUESTS_TOTAL,
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        CLIENT_REQUEST_DURATION_SECONDS,
        "endpoint" => endpoint.to_string()
    )
    .record(duration.as_secs_f64());
}

pub fn record_client_retry(endpoint: &str) {
    counter!(CLIENT_RETRIES_TOTAL, "endpoint" => endpoint.to_string()).increment(1);
}

pub fn record_degraded_federation(lookup: &'static str) {
    counter!(DEGRADED_FEDERATIONS_TOTAL, "lookup" => lookup).increment(1);
}

pub fn record_api_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let status_class = match status_code {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "unknown",
    };

    counter!(
        API_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "endpoint" => path.to_string(),
        "status" => status_class.to_string()
    )
    .increment(1);

    histogram!(
        API_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "endpoint" => path.to_string()
    )
    .record(duration.as_secs_f64());

    debug!(
        method = %method,
        path = %path,
        status_code = status_code,
        duration_ms = duration.as_millis() as u64,
        "Recorded API request metrics"
    );
}

/// Install the Prometheus recorder and describe all metrics
#[cfg(feature = "api")]
pub fn init_prometheus_metrics() -> anyhow::Result<metrics_exporter_prometheus::PrometheusHandle> {
    use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

    const EXPONENTIAL_SECONDS: &[f64] = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            EXPONENTIAL_SECONDS,
        )?
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    describe_metrics();

    Ok(handle)
}
