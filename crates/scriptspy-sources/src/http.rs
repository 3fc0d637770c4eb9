//! Shared HTTP client settings for every provider.

use std::time::Duration;

use reqwest::{Client, Response};
use scriptspy_core::AppConfig;
use serde_json::Value;

use crate::error::SourceError;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Timeout, identity, and retry policy applied to provider requests.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Extra attempts after the first one for transient failures.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "scriptspy/0.1 (trend-research)".to_string(),
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }
}

impl HttpSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.http_timeout_secs,
            user_agent: config.http_user_agent.clone(),
            max_retries: config.source_max_retries,
            backoff_base_ms: config.source_retry_backoff_ms,
        }
    }

    /// Same settings with a different request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub(crate) fn build_client(&self) -> Result<Client, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(self.user_agent.as_str())
            .build()?;
        Ok(client)
    }
}

/// Ensure the base URL has no trailing slash so paths can be appended with `format!`.
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Map a non-2xx response to [`SourceError::Status`].
pub(crate) fn check_status(provider: &'static str, response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceError::Status {
            provider,
            status: status.as_u16(),
        })
    }
}

/// Read a response body as JSON, reporting undecodable bodies as [`SourceError::Parse`].
pub(crate) async fn read_json(provider: &'static str, response: Response) -> Result<Value, SourceError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| SourceError::Parse {
        provider,
        message: e.to_string(),
    })
}
