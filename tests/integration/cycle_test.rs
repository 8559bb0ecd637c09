//! End-to-end tests for bus -> aggregator -> dispatcher

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use scan_alerts::aggregate::Aggregator;
use scan_alerts::bus::SignalBus;
use scan_alerts::dispatch::{DispatchOutcome, Dispatcher};
use scan_alerts::market::{MarketContext, Trend, VolRegime};
use scan_alerts::signal::{Direction, RawSignal};
use scan_alerts::transport::{AlertTransport, TransportError};
use std::sync::{Arc, Mutex};

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

fn t(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 14, 30, 0).unwrap() + Duration::seconds(secs)
}

#[tokio::test]
async fn test_cycle_end_to_end() {
    let bus = SignalBus::new();
    bus.publish(
        RawSignal::new("breakout", "AAPL", Direction::Bull, dec!(0.5))
            .with_reason("20d high")
            .with_timestamp(t(-30)),
    );
    bus.publish(
        RawSignal::new("momentum", "AAPL", Direction::Bull, dec!(0.3))
            .with_reason("20d high")
            .with_reason("rvol 3x")
            .with_timestamp(t(-10)),
    );
    bus.publish(RawSignal::new("volume", "AAPL", Direction::Bull, dec!(0.2)).with_timestamp(t(-5)));
    bus.publish(RawSignal::new("breakdown", "QQQ", Direction::Bear, dec!(0.2)));

    let ctx = MarketContext::new(Trend::Chop, VolRegime::Normal, false);
    let merged = Aggregator::new().aggregate(bus.drain(), &ctx);
    assert!(bus.is_empty());
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].conviction, dec!(0.72));
    assert_eq!(merged[0].reasons, vec!["20d high", "rvol 3x"]);

    let transport = Arc::new(RecordingTransport::default());
    let mut dispatcher = Dispatcher::new(transport.clone(), "-1001", Duration::seconds(600));

    assert!(matches!(
        dispatcher.dispatch_at(&merged[0], &ctx, t(0)).await,
        DispatchOutcome::Sent
    ));
    assert!(matches!(
        dispatcher.dispatch_at(&merged[0], &ctx, t(100)).await,
        DispatchOutcome::Suppressed { .. }
    ));
    assert!(matches!(
        dispatcher.dispatch_at(&merged[0], &ctx, t(700)).await,
        DispatchOutcome::Sent
    ));

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].contains("*breakout+momentum+volume* on `AAPL` (bull)"));
    assert!(sent[0].contains("Conviction: *72%*"));
}

#[tokio::test]
async fn test_risk_off_cycle_suppresses_weak_bulls() {
    let bus = SignalBus::new();
    bus.publish(RawSignal::new("breakout", "TSLA", Direction::Bull, dec!(0.65)));
    bus.publish(RawSignal::new("squeeze", "NVDA", Direction::Bull, dec!(0.75)));

    let ctx = MarketContext::new(Trend::Bear, VolRegime::High, true);
    let merged = Aggregator::new().aggregate(bus.drain(), &ctx);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].symbol, "NVDA");
}
