//! NewsAPI top-headlines collector.

use reqwest::Client;
use serde_json::Value;

use crate::error::SourceError;
use crate::fields::{first_str, first_timestamp};
use crate::http::{check_status, normalize_base_url, read_json, HttpSettings};
use crate::retry::retry_with_backoff;
use crate::types::SourceItem;

const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const PROVIDER: &str = "newsapi";
const PAGE_SIZE: &str = "50";

/// Categories fetched after the uncategorized ("general") headlines.
pub const CATEGORIES: [&str; 3] = ["technology", "business", "entertainment"];

/// NewsAPI replaces taken-down articles with this title.
const REMOVED_TITLE: &str = "[Removed]";

pub struct NewsClient {
    client: Client,
    settings: HttpSettings,
    base_url: String,
    api_key: Option<String>,
    country: String,
}

impl NewsClient {
    /// `api_key` may be `None`; [`NewsClient::fetch_top_headlines`] then fails
    /// with [`SourceError::MissingCredentials`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be constructed.
    pub fn new(
        settings: HttpSettings,
        api_key: Option<String>,
        country: &str,
    ) -> Result<Self, SourceError> {
        Self::with_base_url(settings, api_key, country, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be constructed.
    pub fn with_base_url(
        settings: HttpSettings,
        api_key: Option<String>,
        country: &str,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: settings.build_client()?,
            settings,
            base_url: normalize_base_url(base_url),
            api_key,
            country: country.to_owned(),
        })
    }

    /// Fetch general headlines, then each category in [`CATEGORIES`] order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingCredentials`] without a key, and
    /// [`SourceError::Http`], [`SourceError::Status`], or [`SourceError::Parse`]
    /// if any of the requests fails after retries.
    pub async fn fetch_top_headlines(&self) -> Result<Vec<SourceItem>, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingCredentials {
                provider: PROVIDER,
                vars: "NEWSAPI_KEY",
            })?;

        let mut items = self.fetch_category(api_key, None).await?;
        for category in CATEGORIES {
            items.extend(self.fetch_category(api_key, Some(category)).await?);
        }

        tracing::debug!(provider = PROVIDER, count = items.len(), "fetched headlines");
        Ok(items)
    }

    async fn fetch_category(
        &self,
        api_key: &str,
        category: Option<&str>,
    ) -> Result<Vec<SourceItem>, SourceError> {
        let url = format!("{}/v2/top-headlines", self.base_url);
        let client = &self.client;
        let url = url.as_str();
        let country = self.country.as_str();

        let body = retry_with_backoff(
            PROVIDER,
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            move || async move {
                let mut params = vec![
                    ("apiKey", api_key),
                    ("country", country),
                    ("pageSize", PAGE_SIZE),
                ];
                if let Some(category) = category {
                    params.push(("category", category));
                }
                let response = client.get(url).query(&params).send().await?;
                let response = check_status(PROVIDER, response)?;
                read_json(PROVIDER, response).await
            },
        )
        .await?;

        parse_articles(&body, category.unwrap_or("general"))
    }
}

/// Map a top-headlines response body to source items tagged with `category`.
pub(crate) fn parse_articles(body: &Value, category: &str) -> Result<Vec<SourceItem>, SourceError> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        let message = first_str(body, &["message", "code"])
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(SourceError::Parse {
            provider: PROVIDER,
            message,
        });
    }

    let articles = body
        .get("articles")
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Parse {
            provider: PROVIDER,
            message: "response has no `articles` array".to_string(),
        })?;

    Ok(articles
        .iter()
        .map(|article| SourceItem {
            topic: first_str(article, &["title", "headline", "topic"])
                .filter(|title| title != REMOVED_TITLE),
            description: first_str(article, &["description", "content"]),
            url: first_str(article, &["url", "link"]),
            relevance_score: None,
            published_at: first_timestamp(article, &["publishedAt", "published_at"]),
            tags: Some(category.to_string()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    #[test]
    fn maps_articles_with_synonym_fields() {
        let body = json!({
            "status": "ok",
            "articles": [
                {
                    "title": "Budget 2024 live updates",
                    "description": "What changed",
                    "url": "https://news.example/budget",
                    "publishedAt": "2024-07-23T05:30:00Z"
                },
                { "headline": "Monsoon arrives", "link": "https://news.example/monsoon" },
                { "title": "[Removed]", "url": "https://removed.com" },
                { "title": null }
            ]
        });

        let items = parse_articles(&body, "business").expect("parse");
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].topic.as_deref(), Some("Budget 2024 live updates"));
        assert_eq!(items[0].description.as_deref(), Some("What changed"));
        assert_eq!(
            items[0].published_at,
            Utc.with_ymd_and_hms(2024, 7, 23, 5, 30, 0).single()
        );
        assert_eq!(items[0].tags.as_deref(), Some("business"));
        assert_eq!(items[1].topic.as_deref(), Some("Monsoon arrives"));
        assert_eq!(items[1].url.as_deref(), Some("https://news.example/monsoon"));
        assert!(items[2].topic.is_none());
        assert!(items[3].topic.is_none());
    }

    #[test]
    fn error_status_in_body_is_a_parse_error() {
        let body = json!({"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."});
        let err = parse_articles(&body, "general").unwrap_err();
        assert!(
            matches!(err, SourceError::Parse { ref message, .. } if message == "Your API key is invalid.")
        );
    }

    #[test]
    fn missing_articles_array_is_a_parse_error() {
        let err = parse_articles(&json!({"status": "ok"}), "general").unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }
}
