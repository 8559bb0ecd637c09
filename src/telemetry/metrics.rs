//! Prometheus metrics

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Raw signals that passed ingestion
    SignalsIngested,
    /// Raw signals dropped as malformed
    SignalsDropped,
    /// Merged signals dropped by the floor or regime gates
    SignalsGated,
    /// Alerts handed to the transport successfully
    AlertsSent,
    /// Alerts suppressed by cooldown
    AlertsSuppressed,
    /// Alerts whose transport call failed
    AlertsFailed,
    /// Producer scans that returned an error
    ProducerErrors,
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Full scan cycle
    ScanCycle,
    /// One producer scan
    ProducerScan,
}

impl CounterMetric {
    pub fn name(&self) -> &'static str {
        match self {
            CounterMetric::SignalsIngested => "scanalerts_signals_ingested_total",
            CounterMetric::SignalsDropped => "scanalerts_signals_dropped_total",
            CounterMetric::SignalsGated => "scanalerts_signals_gated_total",
            CounterMetric::AlertsSent => "scanalerts_alerts_sent_total",
            CounterMetric::AlertsSuppressed => "scanalerts_alerts_suppressed_total",
            CounterMetric::AlertsFailed => "scanalerts_alerts_failed_total",
            CounterMetric::ProducerErrors => "scanalerts_producer_errors_total",
        }
    }
}

impl LatencyMetric {
    pub fn name(&self) -> &'static str {
        match self {
            LatencyMetric::ScanCycle => "scanalerts_scan_cycle_latency_ms",
            LatencyMetric::ProducerScan => "scanalerts_producer_scan_latency_ms",
        }
    }
}

/// Increment a counter
pub fn increment_counter(metric: CounterMetric, value: u64) {
    metrics::counter!(metric.name()).increment(value);
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    metrics::histogram!(metric.name()).record(duration.as_secs_f64() * 1000.0);
}

/// Serve `/metrics` on the given port. Must run inside a tokio runtime.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}
