//! Prometheus metrics for the engagement engines and the HTTP edge

use prometheus::{Encoder, HistogramVec, IntCounterVec, TextEncoder};

lazy_static::lazy_static! {
    /// Settled toggles by relation (`like_video`, `subscription`, ...) and
    /// resulting state (`on`/`off`)
    pub static ref TOGGLE_TOTAL: IntCounterVec = prometheus::register_int_counter_vec!(
        "engagement_toggle_total",
        "Toggle operations settled, by relation and resulting state",
        &["relation", "outcome"]
    )
    .expect("engagement_toggle_total registration");

    pub static ref TOGGLE_CONFLICTS_TOTAL: IntCounterVec = prometheus::register_int_counter_vec!(
        "engagement_toggle_conflicts_total",
        "Toggle writes that lost a uniqueness race and were reconciled",
        &["relation"]
    )
    .expect("engagement_toggle_conflicts_total registration");

    /// Comment/tweet/playlist/video writes by entity and action
    pub static ref CONTENT_WRITES_TOTAL: IntCounterVec = prometheus::register_int_counter_vec!(
        "engagement_content_writes_total",
        "Owner-checked content writes applied",
        &["entity", "action"]
    )
    .expect("engagement_content_writes_total registration");

    pub static ref QUERY_DURATION_SECONDS: HistogramVec = prometheus::register_histogram_vec!(
        "engagement_query_duration_seconds",
        "Aggregation query latency",
        &["query"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("engagement_query_duration_seconds registration");

    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = prometheus::register_int_counter_vec!(
        "engagement_http_requests_total",
        "HTTP requests handled",
        &["method", "route", "status"]
    )
    .expect("engagement_http_requests_total registration");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = prometheus::register_histogram_vec!(
        "engagement_http_request_duration_seconds",
        "HTTP request latency",
        &["method", "route", "status"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("engagement_http_request_duration_seconds registration");
}

pub fn record_toggle(relation: &str, on: bool) {
    TOGGLE_TOTAL
        .with_label_values(&[relation, if on { "on" } else { "off" }])
        .inc();
}

pub fn record_conflict(relation: &str) {
    TOGGLE_CONFLICTS_TOTAL.with_label_values(&[relation]).inc();
}

pub fn record_write(entity: &str, action: &str) {
    CONTENT_WRITES_TOTAL
        .with_label_values(&[entity, action])
        .inc();
}

/// Starts a latency timer for `query`; observed when dropped.
pub fn query_timer(query: &str) -> prometheus::HistogramTimer {
    QUERY_DURATION_SECONDS
        .with_label_values(&[query])
        .start_timer()
}

/// Render the default registry in the Prometheus text format
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
