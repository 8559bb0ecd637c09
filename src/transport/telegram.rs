//! Telegram Bot API transport

use super::{AlertTransport, TransportError};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

/// Sends alerts with `sendMessage`
#[derive(Debug, Clone)]
pub struct TelegramTransport {
    client: reqwest::Client,
    bot_token: String,
    base_url: String,
}

impl TelegramTransport {
    /// Create a transport for the given bot token
    pub fn new(bot_token: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_base_url(bot_token, API_BASE)
    }

    /// Create a transport against a different API host
    pub fn with_base_url(
        bot_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            bot_token: bot_token.into(),
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.bot_token)
    }
}

/// Escape text placed outside a code span in legacy Markdown
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Text safe inside a `code` span, which cannot contain a backtick
pub fn escape_code(text: &str) -> String {
    text.replace('`', "'")
}

#[async_trait]
impl AlertTransport for TelegramTransport {
    async fn send(&self, destination: &str, text: &str) -> Result<(), TransportError> {
        if self.bot_token.is_empty() {
            return Err(TransportError::NotConfigured("telegram bot token"));
        }
        if destination.is_empty() {
            return Err(TransportError::NotConfigured("telegram chat id"));
        }

        let payload = SendMessage {
            chat_id: destination,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };

        let response = self.client.post(self.endpoint()).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(chat_id = destination, "Telegram message sent");
        Ok(())
    }
}
