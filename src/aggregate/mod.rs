//! Signal aggregation module
//!
//! Turns a raw per-cycle batch into one decision per (symbol, direction):
//! 1. Validate at the ingestion boundary (drop or clamp)
//! 2. Group by symbol and direction
//! 3. Combine convictions with noisy-OR
//! 4. Merge reasons, namespaced metadata and the most recent price
//! 5. Gate against the conviction floor and the market regime

mod combine;
mod gate;
mod merge;

pub use combine::combine_convictions;
pub use gate::{GateConfig, GateResult, RegimeGate, RejectReason};
pub use merge::{category_label, merge_group, merge_reasons, namespace_metadata, select_price};

use crate::config::AggregatorConfig;
use crate::market::MarketContext;
use crate::signal::{ingest, Direction, RawSignal, Signal};
use crate::telemetry::{increment_counter, CounterMetric};
use std::collections::BTreeMap;

/// Stateless batch aggregator. Deterministic for a given batch and context.
#[derive(Debug, Clone)]
pub struct Aggregator {
    gate: RegimeGate,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    /// Create an aggregator with default thresholds
    pub fn new() -> Self {
        Self::with_config(GateConfig::default())
    }

    pub fn with_config(config: GateConfig) -> Self {
        Self {
            gate: RegimeGate::new(config),
        }
    }

    pub fn from_aggregator_config(config: &AggregatorConfig) -> Self {
        Self::with_config(GateConfig::from(config))
    }

    pub fn gate(&self) -> &RegimeGate {
        &self.gate
    }

    /// Aggregate one cycle's batch.
    ///
    /// Never fails: malformed signals are dropped at ingestion and weak merged
    /// signals are dropped by the gate. Output is ordered by symbol, then direction.
    pub fn aggregate(&self, batch: Vec<RawSignal>, ctx: &MarketContext) -> Vec<Signal> {
        let mut groups: BTreeMap<(String, Direction), Vec<Signal>> = BTreeMap::new();

        for raw in batch {
            match ingest(raw) {
                Ok(signal) => {
                    increment_counter(CounterMetric::SignalsIngested, 1);
                    groups
                        .entry((signal.symbol.clone(), signal.direction))
                        .or_default()
                        .push(signal);
                }
                Err(e) => {
                    increment_counter(CounterMetric::SignalsDropped, 1);
                    tracing::warn!(error = %e, "Dropping malformed signal");
                }
            }
        }

        let mut merged = Vec::with_capacity(groups.len());
        for ((symbol, direction), members) in groups {
            let contributors = members.len();
            let Some(signal) = merge_group(&symbol, direction, members) else {
                continue;
            };

            match self.gate.apply(&signal, ctx) {
                GateResult::Pass => {
                    tracing::debug!(
                        %symbol,
                        %direction,
                        category = %signal.category,
                        conviction = %signal.conviction,
                        contributors,
                        "Merged signal passed gates"
                    );
                    merged.push(signal);
                }
                GateResult::Reject(reason) => {
                    increment_counter(CounterMetric::SignalsGated, 1);
                    tracing::debug!(%symbol, %direction, ?reason, "Merged signal gated");
                }
            }
        }

        merged
    }
}
