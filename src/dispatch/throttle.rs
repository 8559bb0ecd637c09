//! Per-key cooldown tracking

use crate::signal::{Direction, Signal};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Anti-spam identity of an alert
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThrottleKey {
    pub symbol: String,
    pub direction: Direction,
    pub category: String,
}

impl ThrottleKey {
    pub fn new(symbol: impl Into<String>, direction: Direction, category: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            direction,
            category: category.into(),
        }
    }
}

impl From<&Signal> for ThrottleKey {
    fn from(signal: &Signal) -> Self {
        Self::new(signal.symbol.clone(), signal.direction, signal.category.clone())
    }
}

/// Cooldown state of a key at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleState {
    /// Never sent
    Idle,
    /// Cooldown elapsed
    Eligible,
    /// Still inside the cooldown window
    Cooling { remaining: Duration },
}

impl ThrottleState {
    pub fn can_send(&self) -> bool {
        !matches!(self, ThrottleState::Cooling { .. })
    }
}

/// `last_sent_at` per key.
///
/// Entries are never evicted; the symbol universe is small and fixed. State
/// lives only as long as the owning dispatcher, so a restart starts clean.
#[derive(Debug, Clone)]
pub struct CooldownTable {
    cooldown: Duration,
    last_sent: HashMap<ThrottleKey, DateTime<Utc>>,
}

impl CooldownTable {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_sent: HashMap::new(),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Evaluate the state of a key lazily at `now`
    pub fn state(&self, key: &ThrottleKey, now: DateTime<Utc>) -> ThrottleState {
        let Some(last) = self.last_sent.get(key) else {
            return ThrottleState::Idle;
        };

        if self.cooldown <= Duration::zero() {
            return ThrottleState::Eligible;
        }

        let elapsed = now - *last;
        if elapsed >= self.cooldown {
            ThrottleState::Eligible
        } else {
            ThrottleState::Cooling {
                remaining: self.cooldown - elapsed,
            }
        }
    }

    /// Record a send attempt at `at`
    pub fn record(&mut self, key: ThrottleKey, at: DateTime<Utc>) {
        self.last_sent.insert(key, at);
    }

    pub fn last_sent(&self, key: &ThrottleKey) -> Option<DateTime<Utc>> {
        self.last_sent.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.last_sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_sent.is_empty()
    }
}
