//! Alert message formatting (Telegram Markdown)

use crate::market::MarketContext;
use crate::signal::{Direction, Signal};
use crate::transport::{escape_code, escape_markdown};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;

/// Metadata fields worth surfacing in the details block
const DETAIL_FIELDS: [&str; 6] = ["underlying", "last", "volume", "notional", "dte", "expiration_date"];

fn direction_emoji(direction: Direction) -> &'static str {
    match direction {
        Direction::Bull => "🟢",
        Direction::Bear => "🔴",
        Direction::Neutral => "⚪️",
    }
}

/// Conviction as a whole percentage, half away from zero
pub fn conviction_pct(conviction: Decimal) -> Decimal {
    (conviction * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One-line summary of an attached option idea: ticker, kind, strike, expiry
fn summarize_option_play(play: &serde_json::Value) -> Option<String> {
    let play = play.as_object()?;
    let field = |name: &str| {
        play.get(name)
            .filter(|v| !v.is_null())
            .map(render_value)
            .filter(|v| !v.is_empty())
    };

    let mut parts = Vec::new();
    if let Some(ticker) = field("ticker") {
        parts.push(format!("`{}`", escape_code(&ticker)));
    }
    if let Some(kind) = field("kind") {
        parts.push(escape_markdown(&kind.to_uppercase()));
    }
    if let Some(strike) = field("strike") {
        parts.push(escape_markdown(&strike));
    }
    if let Some(expiry) = field("expiry") {
        parts.push(format!("exp `{}`", escape_code(&expiry)));
    }

    (!parts.is_empty()).then(|| parts.join(" "))
}

fn details_block(signal: &Signal) -> String {
    let mut lines = Vec::new();

    if let Some(price) = signal.price {
        lines.push(format!("- price: `{}`", price));
    }

    for (key, value) in &signal.metadata {
        let field = key.rsplit('.').next().unwrap_or(key);
        if DETAIL_FIELDS.contains(&field) {
            lines.push(format!(
                "- {}: `{}`",
                escape_markdown(key),
                escape_code(&render_value(value))
            ));
        }
    }

    for (key, value) in &signal.metadata {
        if key.rsplit('.').next() != Some("options_play") {
            continue;
        }
        if let Some(summary) = summarize_option_play(value) {
            lines.push(format!("- Options idea: {}", summary));
        }
    }

    if lines.is_empty() {
        return String::new();
    }
    format!("\n\n*Details:*\n{}", lines.join("\n"))
}

/// Render a merged signal and the cycle's regime into alert text
pub fn format_alert(signal: &Signal, ctx: &MarketContext) -> String {
    let mut text = format!(
        "{} *{}* on `{}` ({})\n",
        direction_emoji(signal.direction),
        escape_markdown(&signal.category),
        escape_code(&signal.symbol),
        signal.direction
    );

    let _ = write!(
        text,
        "Conviction: *{}%* | Trend: `{}` | Vol: `{}` | Risk-off: *{}*",
        conviction_pct(signal.conviction),
        ctx.trend,
        ctx.vol_regime,
        ctx.risk_off
    );

    if signal.reasons.is_empty() {
        text.push_str("\n\n_No detailed reasons provided._");
    } else {
        text.push_str("\n\n*Why:*");
        for reason in &signal.reasons {
            let _ = write!(text, "\n• {}", escape_markdown(reason));
        }
    }

    text.push_str(&details_block(signal));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{Trend, VolRegime};
    use crate::signal::{ingest, RawSignal};
    use rust_decimal_macros::dec;

    fn merged() -> Signal {
        let mut signal = ingest(
            RawSignal::new("breakout+momentum", "AAPL", Direction::Bull, dec!(0.72))
                .with_reason("20d high")
                .with_reason("rvol 3.1x")
                .with_price(dec!(191.25)),
        )
        .unwrap();
        signal.metadata.insert("breakout.volume".into(), serde_json::json!(1500000));
        signal.metadata.insert("momentum.rsi".into(), serde_json::json!(71));
        signal.metadata.insert("breakout.expiration_date".into(), serde_json::json!("2025-12-19"));
        signal
    }

    #[test]
    fn test_conviction_pct_rounding() {
        assert_eq!(conviction_pct(dec!(0.72)).to_string(), "72");
        assert_eq!(conviction_pct(dec!(0.725)).to_string(), "73");
        assert_eq!(conviction_pct(dec!(0.4049)).to_string(), "40");
        assert_eq!(conviction_pct(dec!(1)).to_string(), "100");
    }

    #[test]
    fn test_format_alert_contents() {
        let ctx = MarketContext::new(Trend::Bull, VolRegime::Normal, false);
        let text = format_alert(&merged(), &ctx);

        assert!(text.starts_with("🟢 *breakout+momentum* on `AAPL` (bull)"));
        assert!(text.contains("Conviction: *72%*"));
        assert!(text.contains("Trend: `bull`"));
        assert!(text.contains("Vol: `normal`"));
        assert!(text.contains("Risk-off: *false*"));
        assert!(text.contains("• 20d high\n• rvol 3.1x"));
        assert!(text.contains("- price: `191.25`"));
        assert!(text.contains("- breakout.volume: `1500000`"));
        assert!(text.contains("- breakout.expiration\\_date: `2025-12-19`"));
        assert!(!text.contains("momentum.rsi"));
    }

    #[test]
    fn test_format_alert_without_reasons_or_details() {
        let signal = ingest(RawSignal::new("gap", "TSLA", Direction::Bear, dec!(0.5))).unwrap();
        let text = format_alert(&signal, &MarketContext::neutral());

        assert!(text.starts_with("🔴 *gap* on `TSLA` (bear)"));
        assert!(text.contains("_No detailed reasons provided._"));
        assert!(!text.contains("*Details:*"));
    }

    #[test]
    fn test_format_alert_escapes_markdown_in_names() {
        let signal = ingest(
            RawSignal::new("dark_pool+volume_monster", "BRK.B", Direction::Bull, dec!(0.8))
                .with_reason("block *size* 2x avg"),
        )
        .unwrap();
        let text = format_alert(&signal, &MarketContext::neutral());

        assert!(text.starts_with("🟢 *dark\\_pool+volume\\_monster* on `BRK.B` (bull)"));
        assert!(text.contains("• block \\*size\\* 2x avg"));
    }

    #[test]
    fn test_format_alert_options_idea() {
        let mut signal = merged();
        signal.metadata.insert(
            "options_unusual.options_play".into(),
            serde_json::json!({"ticker": "O:AAPL251219C00200000", "kind": "call", "strike": 200, "expiry": "2025-12-19"}),
        );
        let text = format_alert(&signal, &MarketContext::neutral());

        assert!(text.contains("- Options idea: `O:AAPL251219C00200000` CALL 200 exp `2025-12-19`"));
        assert!(!text.contains("options_unusual.options_play"));
    }

    #[test]
    fn test_options_idea_skips_missing_fields() {
        let play = serde_json::json!({"ticker": "O:TSLA", "strike": null});
        assert_eq!(summarize_option_play(&play).as_deref(), Some("`O:TSLA`"));
        assert_eq!(summarize_option_play(&serde_json::json!("not an object")), None);
        assert_eq!(summarize_option_play(&serde_json::json!({})), None);
    }
}
