//! Metrics collection for todo-service.
//!
//! Installs the Prometheus recorder behind the `metrics` facade and exposes
//! the per-operation counter the handlers report into.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize metrics collection.
///
/// Must run once at startup, before anything is recorded.
pub fn init_metrics() {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        panic!("failed to set metrics handle: already initialized");
    }
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record the outcome of one todo operation (`create`, `list`, ...).
pub fn record_todo_operation(operation: &'static str, outcome: &'static str) {
    counter!("todo_operations_total", "operation" => operation, "outcome" => outcome).increment(1);
}
