//! Replay command implementation

use crate::aggregate::Aggregator;
use crate::bus::{SignalBus, SignalProducer};
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::market::{MarketContext, StaticContext};
use crate::scanner::{CycleReport, Scanner};
use crate::signal::RawSignal;
use crate::transport::{AlertTransport, LogTransport, TelegramTransport};
use anyhow::Context;
use async_trait::async_trait;
use clap::Args;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON file with `context` and `signals`
    #[arg(short, long)]
    pub input: PathBuf,

    /// Log alerts instead of sending them to Telegram
    #[arg(long)]
    pub dry_run: bool,
}

/// A recorded cycle
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayBatch {
    #[serde(default)]
    pub context: MarketContext,
    #[serde(default)]
    pub signals: Vec<RawSignal>,
}

impl ReplayBatch {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay batch {}", path.display()))?;
        let batch = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse replay batch {}", path.display()))?;
        Ok(batch)
    }
}

/// Publishes a recorded batch as if it came from a live producer
struct ReplayProducer {
    signals: Vec<RawSignal>,
}

#[async_trait]
impl SignalProducer for ReplayProducer {
    fn name(&self) -> &str {
        "replay"
    }

    async fn scan(&self, _ctx: &MarketContext, bus: &SignalBus) -> anyhow::Result<()> {
        for signal in &self.signals {
            bus.publish(signal.clone());
        }
        Ok(())
    }
}

impl ReplayArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<CycleReport> {
        let batch = ReplayBatch::load(&self.input)?;
        tracing::info!(
            input = %self.input.display(),
            signals = batch.signals.len(),
            "Replaying batch"
        );

        let transport: Arc<dyn AlertTransport> = if self.dry_run {
            Arc::new(LogTransport)
        } else {
            Arc::new(TelegramTransport::new(config.telegram.bot_token.clone())?)
        };

        let report = replay(batch, config, transport).await;
        println!(
            "raw={} merged={} sent={} suppressed={} failed={}",
            report.raw, report.merged, report.sent, report.suppressed, report.failed
        );
        Ok(report)
    }
}

/// Run a recorded batch through a fresh scanner
pub async fn replay(batch: ReplayBatch, config: &Config, transport: Arc<dyn AlertTransport>) -> CycleReport {
    let dispatcher = Dispatcher::from_config(transport, config.telegram.chat_id.clone(), &config.dispatcher);
    let aggregator = Aggregator::from_aggregator_config(&config.aggregator);
    let at = batch.context.as_of;

    let mut scanner = Scanner::new(Arc::new(StaticContext::new(batch.context)), aggregator, dispatcher)
        .with_producer(Arc::new(ReplayProducer {
            signals: batch.signals,
        }));

    scanner.run_cycle_at(at).await
}
