//! Integration tests for configuration loading

use rust_decimal_macros::dec;
use scan_alerts::config::Config;

#[test]
fn test_config_example_loads() {
    let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example")).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.aggregator.min_conviction, dec!(0.4));
    assert_eq!(config.dispatcher.cooldown_secs, 600);
    assert_eq!(config.scan.universe, vec!["SPY", "QQQ", "TSLA", "NVDA"]);
    assert!(config.telemetry.metrics_port.is_none());
}
