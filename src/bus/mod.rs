//! Signal bus module
//!
//! Per-cycle collection point where producers deposit raw signals

mod spool;

pub use spool::SpoolProducer;

use crate::market::MarketContext;
use crate::signal::RawSignal;
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// Trait for signal producers ("bots")
#[async_trait]
pub trait SignalProducer: Send + Sync {
    /// Name used in logs and the status heartbeat
    fn name(&self) -> &str;
    /// Scan once and publish any findings to the bus
    async fn scan(&self, ctx: &MarketContext, bus: &SignalBus) -> anyhow::Result<()>;
}

/// In-memory bus for the current scan cycle.
///
/// Safe to publish to from concurrent producers. `drain` swaps the buffer out
/// under the same lock, so publishes for the next cycle never leak into a
/// batch that was already handed off.
#[derive(Debug, Default)]
pub struct SignalBus {
    buffer: Mutex<Vec<RawSignal>>,
}

impl SignalBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a signal to the current cycle. No validation happens here.
    pub fn publish(&self, signal: RawSignal) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(signal);
    }

    /// Take everything published so far and reset the buffer
    pub fn drain(&self) -> Vec<RawSignal> {
        std::mem::take(&mut *self.buffer.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of signals waiting to be drained
    pub fn len(&self) -> usize {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
