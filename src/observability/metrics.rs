//! Metrics collection and exposition.
//!
//! # Metrics
//! - `callback_dispatch_total` (counter): adapter invocations by adapter, event, outcome
//! - `callback_dispatch_duration_seconds` (histogram): adapter latency by adapter
//! - `callback_adapters_registered` (gauge): size of the active adapter list
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed recorder it is a no-op
//! - The Prometheus exporter is only installed when enabled in config

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::callbacks::CallbackEvent;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_adapter_outcome(adapter: &str, event: CallbackEvent, outcome: &'static str) {
    metrics::counter!(
        "callback_dispatch_total",
        "adapter" => adapter.to_string(),
        "event" => event.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_adapter_latency(adapter: &str, elapsed: Duration) {
    metrics::histogram!(
        "callback_dispatch_duration_seconds",
        "adapter" => adapter.to_string()
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_registered_adapters(count: usize) {
    metrics::gauge!("callback_adapters_registered").set(count as f64);
}
