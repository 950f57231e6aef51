//! Metrics and observability utilities
//!
//! Records comparison, generation and retrieval metrics through the
//! `metrics` facade. Without an installed recorder every call is a no-op.

use metrics::{counter, describe_counter, describe_histogram, gauge, describe_gauge, histogram, Unit};

/// Metrics prefix for all ADS demo metrics
pub const METRICS_PREFIX: &str = "adsdemo";

/// Buckets for generation latency (hosted models are slow)
pub const GENERATION_BUCKETS: &[f64] = &[
    0.050, // 50ms
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.500, // 2.5s
    5.000, // 5s
    10.00, // 10s
    30.00, // 30s
    60.00, // 60s
    90.00, // hosted timeout
    180.0, // local timeout
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Comparison metrics
    describe_counter!(
        format!("{}_comparisons_total", METRICS_PREFIX),
        Unit::Count,
        "Total comparisons run"
    );

    describe_histogram!(
        format!("{}_comparison_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "End-to-end comparison latency in seconds"
    );

    // Generation metrics
    describe_counter!(
        format!("{}_generation_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total generation backend calls"
    );

    describe_histogram!(
        format!("{}_generation_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Generation latency in seconds"
    );

    describe_counter!(
        format!("{}_generation_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total failed generation calls"
    );

    // Retrieval metrics
    describe_gauge!(
        format!("{}_retrieval_hits", METRICS_PREFIX),
        Unit::Count,
        "Context items selected by the last retrieval"
    );

    describe_counter!(
        format!("{}_retrieval_fallbacks_total", METRICS_PREFIX),
        Unit::Count,
        "Retrievals that fell back to leading corpus items"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record a finished comparison
pub fn record_comparison(mode: &str, duration_secs: f64) {
    counter!(
        format!("{}_comparisons_total", METRICS_PREFIX),
        "mode" => mode.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_comparison_duration_seconds", METRICS_PREFIX),
        "mode" => mode.to_string()
    )
    .record(duration_secs);
}

/// Helper to record one backend call
pub fn record_generation(provider: &str, duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_generation_requests_total", METRICS_PREFIX),
        "provider" => provider.to_string(),
        "status" => status
    )
    .increment(1);

    if success {
        histogram!(
            format!("{}_generation_duration_seconds", METRICS_PREFIX),
            "provider" => provider.to_string()
        )
        .record(duration_secs);
    } else {
        counter!(
            format!("{}_generation_errors_total", METRICS_PREFIX),
            "provider" => provider.to_string()
        )
        .increment(1);
    }
}

/// Helper to record retrieval outcome
pub fn record_retrieval(hits: usize, fallback: bool) {
    gauge!(format!("{}_retrieval_hits", METRICS_PREFIX)).set(hits as f64);

    if fallback {
        counter!(format!("{}_retrieval_fallbacks_total", METRICS_PREFIX)).increment(1);
    }
}
