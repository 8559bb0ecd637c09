//! Conviction floor and regime gating

use crate::config::AggregatorConfig;
use crate::market::{MarketContext, Trend};
use crate::signal::{Direction, Signal};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Result of gating a merged signal
#[derive(Debug, Clone, PartialEq)]
pub enum GateResult {
    /// Signal may be emitted
    Pass,
    /// Signal dropped
    Reject(RejectReason),
}

/// Reason a merged signal was dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Combined conviction below the global floor
    BelowFloor(Decimal),
    /// Bullish call too weak for a risk-off market
    RiskOffBull(Decimal),
    /// Bearish call too weak while the trend is up
    BearInBullTrend(Decimal),
}

/// Thresholds for the gate chain
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Global minimum combined conviction
    pub min_conviction: Decimal,
    /// Minimum for bull signals when risk-off
    pub risk_off_bull_floor: Decimal,
    /// Minimum for bear signals when the trend is bull
    pub bull_trend_bear_floor: Decimal,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_conviction: dec!(0.4),
            risk_off_bull_floor: dec!(0.7),
            bull_trend_bear_floor: dec!(0.6),
        }
    }
}

impl From<&AggregatorConfig> for GateConfig {
    fn from(config: &AggregatorConfig) -> Self {
        Self {
            min_conviction: config.min_conviction,
            risk_off_bull_floor: config.risk_off_bull_floor,
            bull_trend_bear_floor: config.bull_trend_bear_floor,
        }
    }
}

/// Floor and regime gate chain
#[derive(Debug, Clone)]
pub struct RegimeGate {
    config: GateConfig,
}

impl RegimeGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Apply the floor, then both regime filters
    pub fn apply(&self, signal: &Signal, ctx: &MarketContext) -> GateResult {
        let conviction = signal.conviction;

        if conviction < self.config.min_conviction {
            return GateResult::Reject(RejectReason::BelowFloor(conviction));
        }

        if ctx.risk_off
            && signal.direction == Direction::Bull
            && conviction < self.config.risk_off_bull_floor
        {
            return GateResult::Reject(RejectReason::RiskOffBull(conviction));
        }

        if ctx.trend == Trend::Bull
            && signal.direction == Direction::Bear
            && conviction < self.config.bull_trend_bear_floor
        {
            return GateResult::Reject(RejectReason::BearInBullTrend(conviction));
        }

        GateResult::Pass
    }
}
