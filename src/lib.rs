//! scan-alerts: Signal aggregation and alert dispatch for a market scanner
//!
//! This library provides the core components for:
//! - A per-cycle signal bus that producers publish to
//! - Validation of producer output at a single ingestion boundary
//! - Noisy-OR conviction combination per symbol and direction
//! - Regime gating against the cycle's market context
//! - Cooldown-throttled alert dispatch to Telegram
//! - Scan cycle orchestration with producer isolation and a status heartbeat
//! - Structured logging and Prometheus metrics

pub mod aggregate;
pub mod bus;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod market;
pub mod scanner;
pub mod signal;
pub mod status;
pub mod telemetry;
pub mod transport;
