//! Log-only transport for dry runs

use super::{AlertTransport, TransportError};
use async_trait::async_trait;

/// Writes alerts to the log instead of delivering them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

#[async_trait]
impl AlertTransport for LogTransport {
    async fn send(&self, destination: &str, text: &str) -> Result<(), TransportError> {
        tracing::info!(destination, "[dry-run] alert\n{}", text);
        Ok(())
    }
}
