//! Instagram profile posts via the Apify `instagram-profile-scraper` actor.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::SourceError;
use crate::fields::{first_str, first_timestamp};
use crate::http::{check_status, normalize_base_url, read_json, HttpSettings};
use crate::retry::retry_with_backoff;
use crate::types::InstagramPost;

const DEFAULT_BASE_URL: &str = "https://api.apify.com";
const PROVIDER: &str = "apify";
const ACTOR_ID: &str = "apify~instagram-profile-scraper";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileScraperInput<'a> {
    usernames: [&'a str; 1],
    results_limit: u32,
    results_type: &'static str,
    search_type: &'static str,
}

pub struct InstagramClient {
    client: Client,
    settings: HttpSettings,
    base_url: String,
    api_key: Option<String>,
    results_limit: u32,
}

impl InstagramClient {
    /// `api_key` may be `None`; [`InstagramClient::fetch_recent_posts`] then
    /// fails with [`SourceError::MissingCredentials`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be constructed.
    pub fn new(
        settings: HttpSettings,
        api_key: Option<String>,
        results_limit: u32,
    ) -> Result<Self, SourceError> {
        Self::with_base_url(settings, api_key, results_limit, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be constructed.
    pub fn with_base_url(
        settings: HttpSettings,
        api_key: Option<String>,
        results_limit: u32,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: settings.build_client()?,
            settings,
            base_url: normalize_base_url(base_url),
            api_key,
            results_limit,
        })
    }

    /// Whether an API key is configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run the profile scraper synchronously for `handle` and return its posts.
    ///
    /// A leading `@` on the handle is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingCredentials`] without an API key, and
    /// [`SourceError::Http`], [`SourceError::Status`], or [`SourceError::Parse`]
    /// if the actor call fails after retries.
    pub async fn fetch_recent_posts(&self, handle: &str) -> Result<Vec<InstagramPost>, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingCredentials {
                provider: PROVIDER,
                vars: "APIFY_API_KEY",
            })?;

        let username = handle.trim().trim_start_matches('@').trim();
        let url = format!(
            "{}/v2/acts/{ACTOR_ID}/run-sync-get-dataset-items",
            self.base_url
        );
        let input = ProfileScraperInput {
            usernames: [username],
            results_limit: self.results_limit,
            results_type: "posts",
            search_type: "user",
        };
        let client = &self.client;
        let url = url.as_str();
        let input = &input;

        let body = retry_with_backoff(
            PROVIDER,
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            move || async move {
                let response = client
                    .post(url)
                    .query(&[("token", api_key), ("clean", "true")])
                    .json(input)
                    .send()
                    .await?;
                let response = check_status(PROVIDER, response)?;
                read_json(PROVIDER, response).await
            },
        )
        .await?;

        let posts = parse_dataset_items(&body)?;
        tracing::debug!(provider = PROVIDER, handle = username, count = posts.len(), "fetched instagram posts");
        Ok(posts)
    }
}

/// Map actor dataset items to posts. Items without a URL are skipped.
pub(crate) fn parse_dataset_items(body: &Value) -> Result<Vec<InstagramPost>, SourceError> {
    let items = body.as_array().ok_or_else(|| SourceError::Parse {
        provider: PROVIDER,
        message: "dataset response is not an array".to_string(),
    })?;

    Ok(items
        .iter()
        .filter_map(|item| {
            let post_url = first_str(item, &["url", "postUrl"])?;
            Some(InstagramPost {
                post_url,
                caption: first_str(item, &["caption"]),
                post_type: first_str(item, &["type", "productType"]),
                posted_at: first_timestamp(item, &["timestamp", "takenAtTimestamp"]),
            })
        })
        .collect())
}
