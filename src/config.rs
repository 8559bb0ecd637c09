//! Configuration types for scan-alerts

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Whole seconds as a chrono duration, saturating at `Duration::MAX`
fn chrono_secs(secs: u64) -> chrono::Duration {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX)
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Configuration errors. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: Decimal },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Aggregation thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AggregatorConfig {
    /// Global minimum combined conviction
    #[serde(default = "default_min_conviction")]
    pub min_conviction: Decimal,

    /// Bull signals need at least this much conviction while risk-off
    #[serde(default = "default_risk_off_bull_floor")]
    pub risk_off_bull_floor: Decimal,

    /// Bear signals need at least this much conviction in a bull trend
    #[serde(default = "default_bull_trend_bear_floor")]
    pub bull_trend_bear_floor: Decimal,
}

fn default_min_conviction() -> Decimal {
    Decimal::new(4, 1) // 0.4
}
fn default_risk_off_bull_floor() -> Decimal {
    Decimal::new(7, 1) // 0.7
}
fn default_bull_trend_bear_floor() -> Decimal {
    Decimal::new(6, 1) // 0.6
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            min_conviction: Decimal::new(4, 1),
            risk_off_bull_floor: Decimal::new(7, 1),
            bull_trend_bear_floor: Decimal::new(6, 1),
        }
    }
}

/// Alert dispatch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatcherConfig {
    /// Minimum seconds between alerts for the same (symbol, direction, category)
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

fn default_cooldown_secs() -> u64 {
    600
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { cooldown_secs: 600 }
    }
}

impl DispatcherConfig {
    pub fn cooldown(&self) -> chrono::Duration {
        chrono_secs(self.cooldown_secs)
    }
}

/// Telegram destination configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Chat receiving alerts
    #[serde(default)]
    pub chat_id: String,
    /// Chat receiving the status heartbeat; falls back to `chat_id`
    #[serde(default)]
    pub status_chat_id: Option<String>,
}

impl TelegramConfig {
    /// Destination for the status heartbeat
    pub fn status_destination(&self) -> &str {
        self.status_chat_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.chat_id)
    }
}

/// Scan loop configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Seconds between scan cycles
    #[serde(default = "default_scan_interval")]
    pub interval_secs: u64,

    /// Symbols producers may publish; empty means no restriction
    #[serde(default = "default_universe")]
    pub universe: Vec<String>,

    /// Directory external detectors drop signal batches into
    #[serde(default = "default_spool_dir")]
    pub spool_dir: PathBuf,

    /// JSON market context, re-read every cycle; neutral regime when unset
    #[serde(default)]
    pub context_file: Option<PathBuf>,
}

fn default_scan_interval() -> u64 {
    60
}
fn default_universe() -> Vec<String> {
    ["SPY", "QQQ", "TSLA", "NVDA"].iter().map(|s| s.to_string()).collect()
}
fn default_spool_dir() -> PathBuf {
    PathBuf::from("spool")
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_scan_interval(),
            universe: default_universe(),
            spool_dir: default_spool_dir(),
            context_file: None,
        }
    }
}

impl ScanConfig {
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs)
    }
}

/// Status heartbeat configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusConfig {
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
}

fn default_report_interval() -> u64 {
    600
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 600,
        }
    }
}

impl StatusConfig {
    pub fn report_interval(&self) -> chrono::Duration {
        chrono_secs(self.report_interval_secs)
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; disabled when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Override Telegram settings from `TELEGRAM_*` environment variables
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Some(chat) = lookup("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = chat;
        }
        if let Some(status) = lookup("TELEGRAM_STATUS_CHAT_ID") {
            self.telegram.status_chat_id = Some(status);
        }
    }

    /// Reject thresholds outside [0, 1] and zero intervals
    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = [
            ("aggregator.min_conviction", self.aggregator.min_conviction),
            ("aggregator.risk_off_bull_floor", self.aggregator.risk_off_bull_floor),
            ("aggregator.bull_trend_bear_floor", self.aggregator.bull_trend_bear_floor),
        ];
        for (field, value) in thresholds {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        if self.scan.interval_secs == 0 {
            return Err(ConfigError::Zero {
                field: "scan.interval_secs",
            });
        }

        Ok(())
    }
}
