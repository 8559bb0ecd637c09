//! Market context snapshot

use super::ContextProvider;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Broad market trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bull,
    Bear,
    /// Range-bound or not computed
    #[default]
    #[serde(alias = "unknown", alias = "range")]
    Chop,
}

/// Volatility regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolRegime {
    Low,
    #[default]
    Normal,
    High,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Bull => "bull",
            Trend::Bear => "bear",
            Trend::Chop => "chop",
        })
    }
}

impl fmt::Display for VolRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VolRegime::Low => "low",
            VolRegime::Normal => "normal",
            VolRegime::High => "high",
        })
    }
}

/// Regime snapshot shared by reference for the duration of a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketContext {
    /// When the snapshot was computed
    #[serde(default = "Utc::now")]
    pub as_of: DateTime<Utc>,
    #[serde(default)]
    pub trend: Trend,
    #[serde(default)]
    pub vol_regime: VolRegime,
    #[serde(default)]
    pub risk_off: bool,
}

impl MarketContext {
    pub fn new(trend: Trend, vol_regime: VolRegime, risk_off: bool) -> Self {
        Self {
            as_of: Utc::now(),
            trend,
            vol_regime,
            risk_off,
        }
    }

    /// Regime used when the provider fails: no trend, normal vol, not risk-off
    pub fn neutral() -> Self {
        Self::new(Trend::Chop, VolRegime::Normal, false)
    }
}

impl Default for MarketContext {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Provider that always returns the same snapshot (replay, tests)
#[derive(Debug, Clone)]
pub struct StaticContext {
    context: MarketContext,
}

impl StaticContext {
    pub fn new(context: MarketContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ContextProvider for StaticContext {
    async fn current(&self) -> anyhow::Result<MarketContext> {
        Ok(self.context.clone())
    }
}

/// Provider reading a JSON snapshot written by an external regime job
#[derive(Debug, Clone)]
pub struct FileContext {
    path: PathBuf,
}

impl FileContext {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContextProvider for FileContext {
    async fn current(&self) -> anyhow::Result<MarketContext> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read market context {}", self.path.display()))?;
        let ctx = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse market context {}", self.path.display()))?;
        Ok(ctx)
    }
}
