//! Alert transport module
//!
//! Delivers formatted alert text to a destination (Telegram, or the log)

mod log;
mod telegram;

pub use self::log::LogTransport;
pub use telegram::{escape_code, escape_markdown, TelegramTransport};

use async_trait::async_trait;
use thiserror::Error;

/// Transport errors. Reported by the dispatcher, never propagated.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("destination returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Other(String),
}

/// Trait for alert transport implementations
#[async_trait]
pub trait AlertTransport: Send + Sync {
    /// Send one text payload to a destination
    async fn send(&self, destination: &str, text: &str) -> Result<(), TransportError>;
}
