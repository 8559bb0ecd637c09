//! Producer status heartbeat

use crate::transport::{escape_code, escape_markdown, AlertTransport};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

const MAX_ERROR_LEN: usize = 80;

/// Run history of one producer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProducerRecord {
    pub runs: u64,
    pub errors: u64,
    pub last_ok: bool,
    pub last_error: Option<String>,
    pub last_runtime: std::time::Duration,
    pub last_run_at: Option<DateTime<Utc>>,
}

/// Tracks producer health and periodically posts a summary
pub struct StatusReporter {
    transport: Arc<dyn AlertTransport>,
    destination: String,
    interval: Duration,
    producers: BTreeMap<String, ProducerRecord>,
    last_report: Option<DateTime<Utc>>,
}

fn truncate_error(error: &str) -> String {
    if error.chars().count() <= MAX_ERROR_LEN {
        return error.to_string();
    }
    let head: String = error.chars().take(MAX_ERROR_LEN - 3).collect();
    format!("{}...", head)
}

impl StatusReporter {
    pub fn new(
        transport: Arc<dyn AlertTransport>,
        destination: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            transport,
            destination: destination.into(),
            interval,
            producers: BTreeMap::new(),
            last_report: None,
        }
    }

    pub fn record_success(&mut self, producer: &str, runtime: std::time::Duration, at: DateTime<Utc>) {
        let record = self.producers.entry(producer.to_string()).or_default();
        record.runs += 1;
        record.last_ok = true;
        record.last_error = None;
        record.last_runtime = runtime;
        record.last_run_at = Some(at);
    }

    pub fn record_error(
        &mut self,
        producer: &str,
        error: &str,
        runtime: std::time::Duration,
        at: DateTime<Utc>,
    ) {
        let record = self.producers.entry(producer.to_string()).or_default();
        record.runs += 1;
        record.errors += 1;
        record.last_ok = false;
        record.last_error = Some(error.to_string());
        record.last_runtime = runtime;
        record.last_run_at = Some(at);
    }

    pub fn record(&self, producer: &str) -> Option<&ProducerRecord> {
        self.producers.get(producer)
    }

    /// Heartbeat text
    pub fn format_report(&self) -> String {
        if self.producers.is_empty() {
            return "🩺 Status: no producer runs recorded yet.".to_string();
        }

        let mut text = String::from("🩺 *Scanner Status Heartbeat*");
        for (name, record) in &self.producers {
            let emoji = if record.last_ok { "✅" } else { "❌" };
            let _ = write!(
                text,
                "\n{} `{}` last {} ms, runs={}, errors={}",
                emoji,
                escape_code(name),
                record.last_runtime.as_millis(),
                record.runs,
                record.errors
            );
            if let Some(error) = &record.last_error {
                let _ = write!(text, "\n  ↳ _{}_", escape_markdown(&truncate_error(error)));
            }
        }
        text
    }

    /// Send the heartbeat if the interval has elapsed. Returns whether one was attempted.
    pub async fn maybe_report_at(&mut self, now: DateTime<Utc>) -> bool {
        if let Some(last) = self.last_report {
            if now - last < self.interval {
                return false;
            }
        }
        self.last_report = Some(now);

        let text = self.format_report();
        if let Err(e) = self.transport.send(&self.destination, &text).await {
            tracing::warn!(error = %e, "Failed to send status heartbeat");
        }
        true
    }
}
