//! Ingestion boundary
//!
//! The only place producer output is validated. Everything downstream works
//! with [`Signal`] and never has to check for missing fields.

use super::{RawSignal, Signal};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Why a raw signal was dropped at ingestion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("signal from {category:?} has no symbol")]
    MissingSymbol { category: String },
    #[error("signal from {category:?} for {symbol} has no direction")]
    MissingDirection { category: String, symbol: String },
    #[error("signal for {symbol} has no category")]
    MissingCategory { symbol: String },
}

/// Clamp a conviction into [0, 1]
pub fn clamp_conviction(conviction: Decimal) -> Decimal {
    conviction.clamp(Decimal::ZERO, Decimal::ONE)
}

/// Validate a raw signal.
///
/// Conviction is repaired by clamping; a missing symbol, direction or category
/// rejects the signal. A missing timestamp becomes the oldest representable
/// instant so that it never wins a recency comparison.
pub fn ingest(raw: RawSignal) -> Result<Signal, IngestError> {
    let category = raw.category.trim().to_string();

    let symbol = match raw.symbol.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => return Err(IngestError::MissingSymbol { category }),
    };

    let direction = raw.direction.ok_or_else(|| IngestError::MissingDirection {
        category: category.clone(),
        symbol: symbol.clone(),
    })?;

    if category.is_empty() {
        return Err(IngestError::MissingCategory { symbol });
    }

    Ok(Signal {
        category,
        symbol,
        direction,
        conviction: clamp_conviction(raw.conviction),
        reasons: raw.reasons,
        metadata: raw.metadata,
        price: raw.price,
        timestamp: raw.timestamp.unwrap_or(DateTime::<Utc>::MIN_UTC),
    })
}
