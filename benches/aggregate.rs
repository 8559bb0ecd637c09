//! Benchmarks for batch aggregation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;
use scan_alerts::aggregate::{combine_convictions, Aggregator};
use scan_alerts::market::MarketContext;
use scan_alerts::signal::{Direction, RawSignal};

const CATEGORIES: [&str; 6] = ["breakout", "momentum", "volume", "gap", "dark_pool", "squeeze"];
const SYMBOLS: [&str; 8] = ["SPY", "QQQ", "TSLA", "NVDA", "AAPL", "MSFT", "AMD", "META"];

fn batch() -> Vec<RawSignal> {
    let mut signals = Vec::new();
    for (i, symbol) in SYMBOLS.iter().enumerate() {
        for (j, category) in CATEGORIES.iter().enumerate() {
            let direction = if (i + j) % 3 == 0 { Direction::Bear } else { Direction::Bull };
            let conviction = Decimal::new(((i * 7 + j * 11) % 60 + 20) as i64, 2);
            signals.push(
                RawSignal::new(*category, *symbol, direction, conviction)
                    .with_reason(format!("{} fired", category))
                    .with_metadata("volume", (i * 1000 + j) as u64),
            );
        }
    }
    signals
}

fn benchmark_aggregate_cycle(c: &mut Criterion) {
    let aggregator = Aggregator::new();
    let ctx = MarketContext::neutral();
    let signals = batch();

    c.bench_function("aggregate_48_signals", |b| {
        b.iter(|| aggregator.aggregate(black_box(signals.clone()), &ctx))
    });
}

fn benchmark_combine(c: &mut Criterion) {
    let convictions: Vec<Decimal> = (1..=10).map(|i| Decimal::new(i * 5, 2)).collect();

    c.bench_function("combine_10_convictions", |b| {
        b.iter(|| combine_convictions(black_box(convictions.iter().copied())))
    });
}

criterion_group!(benches, benchmark_aggregate_cycle, benchmark_combine);
criterion_main!(benches);
