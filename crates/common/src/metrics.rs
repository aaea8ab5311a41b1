use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

lazy_static! {
    // Store metrics
    pub static ref STORE_OPERATIONS: CounterVec = register_counter_vec!(
        "catalog_store_operations_total",
        "Total number of document and basket store operations",
        &["operation", "status"]
    )
    .expect("metric cannot be created");

    pub static ref STORE_DURATION: HistogramVec = register_histogram_vec!(
        "catalog_store_duration_seconds",
        "Store operation duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("metric cannot be created");

    // Event metrics
    pub static ref EVENT_COUNTER: CounterVec = register_counter_vec!(
        "catalog_events_total",
        "Total number of queue events processed",
        &["event_type", "status"]
    )
    .expect("metric cannot be created");

    pub static ref EVENT_DURATION: HistogramVec = register_histogram_vec!(
        "catalog_event_duration_seconds",
        "Event processing duration in seconds",
        &["event_type"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("metric cannot be created");
}

/// Outcome label for a store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Success,
    Error,
    Timeout,
    Cancelled,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Success => "success",
            OperationStatus::Error => "error",
            OperationStatus::Timeout => "timeout",
            OperationStatus::Cancelled => "cancelled",
        }
    }
}

/// Get all metrics in Prometheus text format
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Helper function to record a store round trip
pub fn record_store_operation(operation: &str, status: OperationStatus, duration_secs: f64) {
    STORE_OPERATIONS
        .with_label_values(&[operation, status.as_str()])
        .inc();
    STORE_DURATION
        .with_label_values(&[operation])
        .observe(duration_secs);
}

/// Helper function to record event processing
pub fn record_event(event_type: &str, success: bool, duration_secs: f64) {
    let status = if success { "success" } else { "error" };
    EVENT_COUNTER
        .with_label_values(&[event_type, status])
        .inc();
    EVENT_DURATION
        .with_label_values(&[event_type])
        .observe(duration_secs);
}
