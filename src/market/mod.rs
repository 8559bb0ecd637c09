//! Market regime module
//!
//! One [`MarketContext`] snapshot per scan cycle, supplied by a [`ContextProvider`]

mod context;

pub use context::{FileContext, MarketContext, StaticContext, Trend, VolRegime};

use async_trait::async_trait;

/// Trait for market regime providers
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Compute the regime snapshot for the current cycle
    async fn current(&self) -> anyhow::Result<MarketContext>;
}
