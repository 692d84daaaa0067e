use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec, TextEncoder};

// Metrics registry
static RATE_LIMIT_ADMITTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "rate_limit_admitted_total",
        "Requests admitted by the rate limiter",
        &["method"]
    )
    .unwrap()
});

static RATE_LIMIT_REJECTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "rate_limit_rejected_total",
        "Requests rejected with 429",
        &["method"]
    )
    .unwrap()
});

static RATE_LIMIT_EXEMPT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "rate_limit_exempt_total",
        "Requests on exempt paths that bypassed the limiter"
    )
    .unwrap()
});

static RATE_LIMIT_CACHE_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "rate_limit_cache_errors_total",
        "Window store failures, labelled by the failure policy applied",
        &["policy"]
    )
    .unwrap()
});

pub struct MetricsRecorder;

impl MetricsRecorder {
    pub fn record_admitted(method: &str) {
        RATE_LIMIT_ADMITTED_TOTAL.with_label_values(&[method]).inc();
    }

    pub fn record_rejected(method: &str) {
        RATE_LIMIT_REJECTED_TOTAL.with_label_values(&[method]).inc();
    }

    pub fn record_exempt() {
        RATE_LIMIT_EXEMPT_TOTAL.inc();
    }

    pub fn record_cache_error(policy: &str) {
        RATE_LIMIT_CACHE_ERRORS_TOTAL
            .with_label_values(&[policy])
            .inc();
    }

    /// Export all metrics in Prometheus format
    pub fn export() -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        encoder.encode_to_string(&metric_families)
    }
}
