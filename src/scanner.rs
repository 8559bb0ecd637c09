//! Scan cycle orchestration
//!
//! One cycle: context -> all producers (barrier) -> drain -> aggregate -> dispatch

use crate::aggregate::Aggregator;
use crate::bus::{SignalBus, SignalProducer};
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::market::{ContextProvider, MarketContext};
use crate::status::StatusReporter;
use crate::telemetry::{increment_counter, record_latency, CounterMetric, LatencyMetric};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::MissedTickBehavior;

/// Summary of one scan cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Raw signals drained from the bus
    pub raw: usize,
    /// Merged signals that passed the gates
    pub merged: usize,
    pub sent: usize,
    pub suppressed: usize,
    pub failed: usize,
    /// Producers whose scan failed this cycle
    pub producer_errors: usize,
}

/// Runs scan cycles over a fixed set of producers
pub struct Scanner {
    producers: Vec<Arc<dyn SignalProducer>>,
    context: Arc<dyn ContextProvider>,
    bus: SignalBus,
    aggregator: Aggregator,
    dispatcher: Dispatcher,
    status: Option<StatusReporter>,
}

impl Scanner {
    pub fn new(context: Arc<dyn ContextProvider>, aggregator: Aggregator, dispatcher: Dispatcher) -> Self {
        Self {
            producers: Vec::new(),
            context,
            bus: SignalBus::new(),
            aggregator,
            dispatcher,
            status: None,
        }
    }

    pub fn with_producer(mut self, producer: Arc<dyn SignalProducer>) -> Self {
        self.producers.push(producer);
        self
    }

    pub fn with_status(mut self, status: StatusReporter) -> Self {
        self.status = Some(status);
        self
    }

    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn status(&self) -> Option<&StatusReporter> {
        self.status.as_ref()
    }

    async fn market_context(&self) -> MarketContext {
        match self.context.current().await {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::warn!(error = %e, "Market context unavailable, using neutral regime");
                MarketContext::neutral()
            }
        }
    }

    /// Run every producer to completion. Failures are isolated: whatever a
    /// failing producer published before it failed stays on the bus.
    async fn run_producers(&mut self, ctx: &MarketContext, now: DateTime<Utc>) -> usize {
        let bus = &self.bus;
        let runs = self.producers.iter().map(|producer| async move {
            let start = Instant::now();
            let result = AssertUnwindSafe(producer.scan(ctx, bus))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(anyhow::anyhow!("producer panicked")));
            (producer.name().to_string(), result, start.elapsed())
        });
        let results = join_all(runs).await;

        let mut errors = 0;
        for (name, result, runtime) in results {
            record_latency(LatencyMetric::ProducerScan, runtime);
            match result {
                Ok(()) => {
                    if let Some(status) = self.status.as_mut() {
                        status.record_success(&name, runtime, now);
                    }
                }
                Err(e) => {
                    errors += 1;
                    increment_counter(CounterMetric::ProducerErrors, 1);
                    tracing::error!(producer = %name, error = %e, "Producer failed");
                    if let Some(status) = self.status.as_mut() {
                        status.record_error(&name, &e.to_string(), runtime, now);
                    }
                }
            }
        }
        errors
    }

    /// Run one cycle using the wall clock
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle as if the current time were `now`
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> CycleReport {
        let start = Instant::now();
        let ctx = self.market_context().await;
        tracing::info!(
            trend = %ctx.trend,
            vol = %ctx.vol_regime,
            risk_off = ctx.risk_off,
            "Market context"
        );

        let producer_errors = self.run_producers(&ctx, now).await;

        let raw = self.bus.drain();
        let mut report = CycleReport {
            raw: raw.len(),
            producer_errors,
            ..Default::default()
        };
        if !raw.is_empty() {
            tracing::info!(count = raw.len(), "Collected raw signals");
        }

        let merged = self.aggregator.aggregate(raw, &ctx);
        report.merged = merged.len();

        for signal in &merged {
            match self.dispatcher.dispatch_at(signal, &ctx, now).await {
                DispatchOutcome::Sent => report.sent += 1,
                DispatchOutcome::Suppressed { .. } => report.suppressed += 1,
                DispatchOutcome::Failed(_) => report.failed += 1,
            }
        }

        if let Some(status) = self.status.as_mut() {
            status.maybe_report_at(now).await;
        }

        record_latency(LatencyMetric::ScanCycle, start.elapsed());
        tracing::info!(?report, "Scan cycle complete");
        report
    }

    /// Run cycles every `interval` until `shutdown` resolves.
    ///
    /// A cycle in progress always completes before shutdown is observed.
    pub async fn run<F>(&mut self, interval: std::time::Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Scanner shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{StaticContext, Trend, VolRegime};
    use crate::signal::{Direction, RawSignal};
    use crate::transport::{AlertTransport, TransportError};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AlertTransport for RecordingTransport {
        async fn send(&self, _destination: &str, text: &str) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct FixedProducer {
        name: String,
        signals: Vec<(&'static str, Direction, Decimal)>,
        fail_after_publish: bool,
    }

    impl FixedProducer {
        fn new(name: &str, signals: Vec<(&'static str, Direction, Decimal)>) -> Self {
            Self {
                name: name.to_string(),
                signals,
                fail_after_publish: false,
            }
        }

        fn failing(mut self) -> Self {
            self.fail_after_publish = true;
            self
        }
    }

    #[async_trait]
    impl SignalProducer for FixedProducer {
        fn name(&self) -> &str {
            &self.name
        }

        async fn scan(&self, _ctx: &MarketContext, bus: &SignalBus) -> anyhow::Result<()> {
            for (symbol, direction, conviction) in &self.signals {
                bus.publish(
                    RawSignal::new(self.name.clone(), *symbol, *direction, *conviction)
                        .with_reason(format!("{} fired", self.name)),
                );
            }
            if self.fail_after_publish {
                anyhow::bail!("provider returned 502");
            }
            Ok(())
        }
    }

    struct PanickingProducer;

    #[async_trait]
    impl SignalProducer for PanickingProducer {
        fn name(&self) -> &str {
            "panicky"
        }

        async fn scan(&self, _ctx: &MarketContext, _bus: &SignalBus) -> anyhow::Result<()> {
            panic!("index out of bounds");
        }
    }

    struct FailingContext;

    #[async_trait]
    impl ContextProvider for FailingContext {
        async fn current(&self) -> anyhow::Result<MarketContext> {
            anyhow::bail!("regime data unavailable")
        }
    }

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 14, 30, 0).unwrap() + Duration::seconds(secs)
    }

    fn scanner(context: Arc<dyn ContextProvider>, transport: Arc<RecordingTransport>) -> Scanner {
        let dispatcher = Dispatcher::new(transport, "-1001", Duration::seconds(600));
        Scanner::new(context, Aggregator::new(), dispatcher)
    }

    fn neutral() -> Arc<dyn ContextProvider> {
        Arc::new(StaticContext::new(MarketContext::neutral()))
    }

    #[tokio::test]
    async fn test_cycle_merges_producers() {
        let transport = Arc::new(RecordingTransport::default());
        let mut scanner = scanner(neutral(), transport.clone())
            .with_producer(Arc::new(FixedProducer::new(
                "breakout",
                vec![("AAPL", Direction::Bull, dec!(0.3))],
            )))
            .with_producer(Arc::new(FixedProducer::new(
                "momentum",
                vec![("AAPL", Direction::Bull, dec!(0.3)), ("TSLA", Direction::Bear, dec!(0.2))],
            )));

        let report = scanner.run_cycle_at(t(0)).await;

        assert_eq!(report.raw, 3);
        assert_eq!(report.merged, 1);
        assert_eq!(report.sent, 1);
        assert!(scanner.bus().is_empty());

        let sent = transport.sent.lock().unwrap();
        assert!(sent[0].contains("*breakout+momentum* on `AAPL`"));
        assert!(sent[0].contains("Conviction: *51%*"));
    }

    #[tokio::test]
    async fn test_failed_producer_output_still_aggregated() {
        let transport = Arc::new(RecordingTransport::default());
        let mut scanner = scanner(neutral(), transport.clone())
            .with_status(StatusReporter::new(
                transport.clone(),
                "-1002",
                Duration::seconds(600),
            ))
            .with_producer(Arc::new(
                FixedProducer::new("dark_pool", vec![("NVDA", Direction::Bull, dec!(0.6))]).failing(),
            ))
            .with_producer(Arc::new(PanickingProducer));

        let report = scanner.run_cycle_at(t(0)).await;

        assert_eq!(report.producer_errors, 2);
        assert_eq!(report.raw, 1);
        assert_eq!(report.sent, 1);

        let status = scanner.status().unwrap();
        let record = status.record("dark_pool").unwrap();
        assert_eq!(record.errors, 1);
        assert_eq!(record.last_error.as_deref(), Some("provider returned 502"));
        assert_eq!(status.record("panicky").unwrap().errors, 1);
    }

    #[tokio::test]
    async fn test_repeat_cycle_is_throttled() {
        let transport = Arc::new(RecordingTransport::default());
        let mut scanner = scanner(neutral(), transport.clone()).with_producer(Arc::new(
            FixedProducer::new("breakout", vec![("AAPL", Direction::Bull, dec!(0.5))]),
        ));

        assert_eq!(scanner.run_cycle_at(t(0)).await.sent, 1);
        let second = scanner.run_cycle_at(t(60)).await;
        assert_eq!(second.sent, 0);
        assert_eq!(second.suppressed, 1);
        assert_eq!(scanner.run_cycle_at(t(660)).await.sent, 1);
    }

    #[tokio::test]
    async fn test_context_failure_falls_back_to_neutral() {
        let transport = Arc::new(RecordingTransport::default());
        let mut scanner = scanner(Arc::new(FailingContext), transport.clone()).with_producer(
            Arc::new(FixedProducer::new("breakout", vec![("AAPL", Direction::Bull, dec!(0.5))])),
        );

        let report = scanner.run_cycle_at(t(0)).await;
        assert_eq!(report.sent, 1);
        assert!(transport.sent.lock().unwrap()[0].contains("Trend: `chop`"));
    }

    #[tokio::test]
    async fn test_regime_gates_apply_in_cycle() {
        let transport = Arc::new(RecordingTransport::default());
        let risk_off: Arc<dyn ContextProvider> =
            Arc::new(StaticContext::new(MarketContext::new(Trend::Bear, VolRegime::High, true)));
        let mut scanner = scanner(risk_off, transport.clone()).with_producer(Arc::new(
            FixedProducer::new(
                "squeeze",
                vec![("AAPL", Direction::Bull, dec!(0.65)), ("QQQ", Direction::Bear, dec!(0.45))],
            ),
        ));

        let report = scanner.run_cycle_at(t(0)).await;
        assert_eq!(report.raw, 2);
        assert_eq!(report.merged, 1);
        assert!(transport.sent.lock().unwrap()[0].contains("`QQQ`"));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let transport = Arc::new(RecordingTransport::default());
        let mut scanner = scanner(neutral(), transport.clone()).with_producer(Arc::new(
            FixedProducer::new("breakout", vec![("AAPL", Direction::Bull, dec!(0.5))]),
        ));

        let shutdown = tokio::time::sleep(std::time::Duration::from_millis(50));
        scanner.run(std::time::Duration::from_millis(10), shutdown).await;

        // First tick fires immediately; later cycles are throttled.
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }
}
