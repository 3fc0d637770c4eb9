//! Telegram bot notifier.

use std::time::Duration;

use reqwest::Client;
use scriptspy_core::AppConfig;
use serde_json::json;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram rejected the message with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

struct BotTarget {
    token: String,
    chat_id: String,
}

/// Sends plain-text messages to one Telegram chat.
///
/// Without both a bot token and a chat id the notifier is disabled and
/// [`TelegramNotifier::notify`] does nothing.
pub struct TelegramNotifier {
    client: Client,
    base_url: String,
    target: Option<BotTarget>,
}

impl TelegramNotifier {
    /// # Errors
    ///
    /// Returns [`NotificationError::Http`] if the HTTP client cannot be constructed.
    pub fn new(
        bot_token: Option<String>,
        chat_id: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, NotificationError> {
        Self::with_base_url(bot_token, chat_id, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a notifier with a custom API base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Http`] if the HTTP client cannot be constructed.
    pub fn with_base_url(
        bot_token: Option<String>,
        chat_id: Option<String>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let target = match (bot_token, chat_id) {
            (Some(token), Some(chat_id)) => Some(BotTarget { token, chat_id }),
            _ => None,
        };

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            target,
        })
    }

    /// # Errors
    ///
    /// Returns [`NotificationError::Http`] if the HTTP client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, NotificationError> {
        Self::new(
            config.telegram_bot_token.clone(),
            config.telegram_chat_id.clone(),
            config.http_timeout_secs,
        )
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Send `message` to the configured chat. A disabled notifier returns `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Http`] on transport failure or
    /// [`NotificationError::Rejected`] if Telegram answers with a non-2xx status.
    pub async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        let Some(target) = &self.target else {
            tracing::debug!("notifier: telegram credentials not configured; skipping");
            return Ok(());
        };

        let url = format!("{}/bot{}/sendMessage", self.base_url, target.token);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "chat_id": target.chat_id, "text": message }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
