// src/core/metrics.rs

//! Defines and registers Prometheus metrics for topology discovery.
//!
//! This module uses `lazy_static` to ensure that metrics are registered only once
//! globally for the entire application lifecycle.

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, TextEncoder, register_counter, register_counter_vec,
    register_gauge, register_histogram,
};

lazy_static! {
    /// Probes issued, labeled by `phase` (`seed` or `peer`).
    pub static ref PROBES_TOTAL: CounterVec =
        register_counter_vec!("ringprobe_probes_total", "Total number of daemon probes, labeled by phase.", &["phase"]).unwrap();
    /// Probes that failed or timed out, labeled by `phase`.
    pub static ref PROBE_FAILURES_TOTAL: CounterVec =
        register_counter_vec!("ringprobe_probe_failures_total", "Total number of failed daemon probes, labeled by phase.", &["phase"]).unwrap();
    /// Discovery attempts, successful or not.
    pub static ref DISCOVERIES_TOTAL: Counter =
        register_counter!("ringprobe_discoveries_total", "Total number of topology discovery attempts.").unwrap();
    /// The verdict of the last published discovery.
    pub static ref CLUSTER_HEALTHY: Gauge =
        register_gauge!("ringprobe_cluster_healthy", "Indicates if the discovered cluster is consistent (1 for true, 0 for false).").unwrap();

    /// Wall-clock time of individual probes, including ones that time out.
    pub static ref PROBE_LATENCY_SECONDS: Histogram =
        register_histogram!("ringprobe_probe_latency_seconds", "Latency of daemon probes in seconds.").unwrap();
}

/// Gathers all registered metrics and encodes them into the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_else(|e| format!("# failed to encode metrics: {e}\n"))
}
