//! Signal types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Auxiliary facts attached by a producer. Passed through, never interpreted.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Directional opinion of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Expecting the symbol to go up
    Bull,
    /// Expecting the symbol to go down
    Bear,
    /// No directional bias
    Neutral,
}

impl Direction {
    /// Lowercase label used in keys and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Bull => "bull",
            Direction::Bear => "bear",
            Direction::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signal as deposited on the bus by a producer.
///
/// Nothing here is trusted: symbol and direction may be missing and conviction
/// may be out of range. [`ingest`](super::ingest) turns it into a [`Signal`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSignal {
    /// Detector / strategy identity. Older producers call this `bot` or `kind`.
    #[serde(alias = "bot", alias = "kind")]
    pub category: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub conviction: Decimal,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default, alias = "extra")]
    pub metadata: Metadata,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawSignal {
    /// Create a new raw signal stamped with the current time
    pub fn new(
        category: impl Into<String>,
        symbol: impl Into<String>,
        direction: Direction,
        conviction: Decimal,
    ) -> Self {
        Self {
            category: category.into(),
            symbol: Some(symbol.into()),
            direction: Some(direction),
            conviction,
            reasons: Vec::new(),
            metadata: Metadata::new(),
            price: None,
            timestamp: Some(Utc::now()),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A validated signal.
///
/// Produced by ingestion (one detector's opinion) or by the aggregator (one
/// merged decision per symbol and direction). `conviction` is always in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Detector identity, or `a+b` for a merged signal
    pub category: String,
    /// Instrument identifier
    pub symbol: String,
    /// Directional opinion
    pub direction: Direction,
    /// Confidence in [0, 1]
    pub conviction: Decimal,
    /// Human-readable reasons, in first-occurrence order
    pub reasons: Vec<String>,
    /// Pass-through facts
    pub metadata: Metadata,
    /// Last observed price
    pub price: Option<Decimal>,
    /// When the condition was observed
    pub timestamp: DateTime<Utc>,
}
