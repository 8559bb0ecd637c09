//! Alert dispatch module
//!
//! Throttles merged signals per (symbol, direction, category) and hands the
//! formatted text to an [`AlertTransport`]

mod format;
mod throttle;

pub use format::{conviction_pct, format_alert};
pub use throttle::{CooldownTable, ThrottleKey, ThrottleState};

use crate::config::DispatcherConfig;
use crate::market::MarketContext;
use crate::signal::Signal;
use crate::telemetry::{increment_counter, CounterMetric};
use crate::transport::{AlertTransport, TransportError};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// What happened to one dispatch request
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Handed to the transport successfully
    Sent,
    /// Key still cooling down; nothing was sent
    Suppressed { remaining: Duration },
    /// Transport failed; the cooldown still advanced
    Failed(TransportError),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent)
    }
}

/// Owns the cooldown table and the alert transport.
///
/// Calls are expected to be sequential for a batch (`&mut self`), which
/// serializes all cooldown mutation.
pub struct Dispatcher {
    transport: Arc<dyn AlertTransport>,
    destination: String,
    cooldowns: CooldownTable,
}

impl Dispatcher {
    /// Create a dispatcher with an empty cooldown history
    pub fn new(
        transport: Arc<dyn AlertTransport>,
        destination: impl Into<String>,
        cooldown: Duration,
    ) -> Self {
        Self {
            transport,
            destination: destination.into(),
            cooldowns: CooldownTable::new(cooldown),
        }
    }

    pub fn from_config(
        transport: Arc<dyn AlertTransport>,
        destination: impl Into<String>,
        config: &DispatcherConfig,
    ) -> Self {
        Self::new(transport, destination, config.cooldown())
    }

    pub fn cooldowns(&self) -> &CooldownTable {
        &self.cooldowns
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Dispatch using the wall clock
    pub async fn dispatch(&mut self, signal: &Signal, ctx: &MarketContext) -> DispatchOutcome {
        self.dispatch_at(signal, ctx, Utc::now()).await
    }

    /// Dispatch as if the current time were `now`.
    ///
    /// The cooldown is recorded at attempt time, before the transport result
    /// is known. A failed send is not retried and the key stays cooling, so a
    /// transient transport error drops that alert until the window clears.
    /// This trades a lost alert for never sending the same alert twice.
    pub async fn dispatch_at(
        &mut self,
        signal: &Signal,
        ctx: &MarketContext,
        now: DateTime<Utc>,
    ) -> DispatchOutcome {
        let key = ThrottleKey::from(signal);

        if let ThrottleState::Cooling { remaining } = self.cooldowns.state(&key, now) {
            increment_counter(CounterMetric::AlertsSuppressed, 1);
            tracing::debug!(
                symbol = %key.symbol,
                direction = %key.direction,
                category = %key.category,
                remaining_secs = remaining.num_seconds(),
                "Alert throttled"
            );
            return DispatchOutcome::Suppressed { remaining };
        }

        let text = format_alert(signal, ctx);
        self.cooldowns.record(key, now);

        match self.transport.send(&self.destination, &text).await {
            Ok(()) => {
                increment_counter(CounterMetric::AlertsSent, 1);
                tracing::info!(
                    symbol = %signal.symbol,
                    direction = %signal.direction,
                    category = %signal.category,
                    conviction = %signal.conviction,
                    "Alert sent"
                );
                DispatchOutcome::Sent
            }
            Err(e) => {
                increment_counter(CounterMetric::AlertsFailed, 1);
                tracing::warn!(
                    symbol = %signal.symbol,
                    category = %signal.category,
                    error = %e,
                    "Failed to send alert"
                );
                DispatchOutcome::Failed(e)
            }
        }
    }
}
