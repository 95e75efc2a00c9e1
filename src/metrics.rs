//! Prometheus metrics for the dashboard backend
//!
//! Counts cache hits/misses, upstream fetch outcomes and persistence results.

use crate::Result;
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Encoder,
    Histogram, IntCounter, TextEncoder,
};

lazy_static! {
    /// Counter: cache lookups by outcome (hit/miss/error)
    pub static ref CACHE_LOOKUPS: CounterVec = register_counter_vec!(
        "mgnrega_cache_lookups_total",
        "Cache lookups by outcome",
        &["outcome"]
    )
    .expect("Failed to create cache_lookups metric");

    /// Counter: upstream fetches by outcome
    pub static ref UPSTREAM_FETCHES: CounterVec = register_counter_vec!(
        "mgnrega_upstream_fetches_total",
        "Upstream fetches by outcome",
        &["outcome"]
    )
    .expect("Failed to create upstream_fetches metric");

    /// Histogram: upstream fetch duration (seconds)
    pub static ref UPSTREAM_DURATION: Histogram = register_histogram!(
        "mgnrega_upstream_duration_seconds",
        "Duration of upstream fetches",
        vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("Failed to create upstream_duration metric");

    /// Counter: aggregate rows newly written to the cache
    pub static ref ROWS_INSERTED: IntCounter = register_int_counter!(
        "mgnrega_cache_rows_inserted_total",
        "Aggregate rows inserted into the cache"
    )
    .expect("Failed to create rows_inserted metric");

    /// Counter: storage failures by operation (lookup/insert)
    pub static ref STORAGE_ERRORS: CounterVec = register_counter_vec!(
        "mgnrega_storage_errors_total",
        "Cache store failures by operation",
        &["operation"]
    )
    .expect("Failed to create storage_errors metric");
}

/// Record cache hit
pub fn record_cache_hit() {
    CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
}

/// Record cache miss
pub fn record_cache_miss() {
    CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
}

/// Record a failed storage operation
pub fn record_storage_error(operation: &str) {
    if operation == "lookup" {
        CACHE_LOOKUPS.with_label_values(&["error"]).inc();
    }
    STORAGE_ERRORS.with_label_values(&[operation]).inc();
}

/// Record an upstream fetch and its duration
pub fn record_upstream_fetch<T>(result: &Result<T>, duration_secs: f64) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    UPSTREAM_FETCHES.with_label_values(&[outcome]).inc();
    UPSTREAM_DURATION.observe(duration_secs);
}

/// Record rows inserted by one persistence step
pub fn record_rows_inserted(count: usize) {
    ROWS_INSERTED.inc_by(count as u64);
}

/// Gather all metrics in Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
