//! Run command implementation

use crate::aggregate::Aggregator;
use crate::bus::SpoolProducer;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::market::{ContextProvider, FileContext, MarketContext, StaticContext};
use crate::scanner::Scanner;
use crate::status::StatusReporter;
use crate::transport::{AlertTransport, LogTransport, TelegramTransport};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Log alerts instead of sending them to Telegram
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let transport: Arc<dyn AlertTransport> = if self.dry_run {
            Arc::new(LogTransport)
        } else {
            Arc::new(TelegramTransport::new(config.telegram.bot_token.clone())?)
        };

        tracing::info!(
            interval_secs = config.scan.interval_secs,
            spool = %config.scan.spool_dir.display(),
            universe = config.scan.universe.len(),
            "Starting scanner loop"
        );

        let mut scanner = build_scanner(config, transport);
        scanner
            .run(config.scan.interval(), async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to listen for ctrl-c");
                }
            })
            .await;

        Ok(())
    }
}

/// Wire the live scanner from configuration
pub fn build_scanner(config: &Config, transport: Arc<dyn AlertTransport>) -> Scanner {
    let context: Arc<dyn ContextProvider> = match &config.scan.context_file {
        Some(path) => Arc::new(FileContext::new(path)),
        None => Arc::new(StaticContext::new(MarketContext::neutral())),
    };

    let dispatcher = Dispatcher::from_config(transport.clone(), config.telegram.chat_id.clone(), &config.dispatcher);
    let status = StatusReporter::new(
        transport,
        config.telegram.status_destination(),
        config.status.report_interval(),
    );
    let producer = SpoolProducer::new(&config.scan.spool_dir, config.scan.universe.iter().cloned());

    Scanner::new(context, Aggregator::from_aggregator_config(&config.aggregator), dispatcher)
        .with_producer(Arc::new(producer))
        .with_status(status)
}
