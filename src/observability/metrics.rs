use std::sync::OnceLock;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Global metrics instance.
pub static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Metrics collector for the posting pipeline.
#[derive(Debug, Clone, Default)]
pub struct Metrics;

impl Metrics {
    pub fn new() -> Self {
        Self
    }

    pub fn record_invoice_created(&self) {
        counter!("fms_invoices_created_total").increment(1);
    }

    pub fn record_invoice_posted(&self) {
        counter!("fms_invoices_posted_total").increment(1);
    }

    pub fn record_journal_posted(&self) {
        counter!("fms_journal_entries_posted_total").increment(1);
    }

    pub fn record_ledger_post_failure(&self, cause: &str) {
        counter!("fms_ledger_post_failures_total", "cause" => cause.to_string()).increment(1);
    }

    pub fn record_ledger_call_latency(&self, duration_ms: f64, success: bool) {
        histogram!("fms_ledger_call_duration_ms", "success" => success.to_string())
            .record(duration_ms);
    }
}

/// Timer for measuring operation latency.
#[derive(Default)]
pub struct LatencyTimer {
    start: Option<Instant>,
}

impl LatencyTimer {
    pub fn new() -> Self {
        Self {
            start: Some(Instant::now()),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start
            .map(|s| s.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Initializes the metrics system and returns the Prometheus handle.
pub fn init_metrics() -> PrometheusHandle {
    let handle = METRICS_HANDLE.get_or_init(|| {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("Failed to install Prometheus recorder");

        describe_metrics();
        handle
    });

    METRICS.get_or_init(Metrics::new);

    handle.clone()
}

fn describe_metrics() {
    describe_counter!(
        "fms_invoices_created_total",
        Unit::Count,
        "Total number of invoices created"
    );
    describe_counter!(
        "fms_invoices_posted_total",
        Unit::Count,
        "Total number of invoices finalized as Posted"
    );
    describe_counter!(
        "fms_journal_entries_posted_total",
        Unit::Count,
        "Total number of journal entries committed to the ledger"
    );
    describe_counter!(
        "fms_ledger_post_failures_total",
        Unit::Count,
        "Outbound ledger posting failures by cause"
    );
    describe_histogram!(
        "fms_ledger_call_duration_ms",
        Unit::Milliseconds,
        "Outbound ledger call latency in milliseconds"
    );
}

/// Returns the global metrics instance.
pub fn get_metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}
