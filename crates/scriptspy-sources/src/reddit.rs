//! Reddit hot-posts collector (client-credentials OAuth).

use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde_json::Value;

use crate::error::SourceError;
use crate::fields::{first_f64, first_str};
use crate::http::{check_status, normalize_base_url, read_json, HttpSettings};
use crate::retry::retry_with_backoff;
use crate::types::SourceItem;

const DEFAULT_AUTH_BASE_URL: &str = "https://www.reddit.com";
const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com";
const PROVIDER: &str = "reddit";
const PERMALINK_BASE: &str = "https://www.reddit.com";

/// Script-app credentials. Reddit rejects requests without a descriptive user agent.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

pub struct RedditClient {
    client: Client,
    settings: HttpSettings,
    auth_base_url: String,
    api_base_url: String,
    credentials: Option<RedditCredentials>,
    subreddits: Vec<String>,
    posts_per_subreddit: u32,
}

impl RedditClient {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be constructed.
    pub fn new(
        settings: HttpSettings,
        credentials: Option<RedditCredentials>,
        subreddits: Vec<String>,
        posts_per_subreddit: u32,
    ) -> Result<Self, SourceError> {
        Self::with_base_urls(
            settings,
            credentials,
            subreddits,
            posts_per_subreddit,
            DEFAULT_AUTH_BASE_URL,
            DEFAULT_API_BASE_URL,
        )
    }

    /// Creates a client with custom token and API hosts (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be constructed.
    pub fn with_base_urls(
        settings: HttpSettings,
        credentials: Option<RedditCredentials>,
        subreddits: Vec<String>,
        posts_per_subreddit: u32,
        auth_base_url: &str,
        api_base_url: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: settings.build_client()?,
            settings,
            auth_base_url: normalize_base_url(auth_base_url),
            api_base_url: normalize_base_url(api_base_url),
            credentials,
            subreddits,
            posts_per_subreddit,
        })
    }

    /// Fetch hot posts from every configured subreddit, in configuration order.
    ///
    /// A fresh access token is requested on every call.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingCredentials`] without client credentials,
    /// and [`SourceError::Http`], [`SourceError::Status`], or
    /// [`SourceError::Parse`] if the token exchange or a listing fails.
    pub async fn fetch_hot_posts(&self) -> Result<Vec<SourceItem>, SourceError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(SourceError::MissingCredentials {
                provider: PROVIDER,
                vars: "REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET",
            })?;

        let token = self.fetch_token(credentials).await?;

        let mut items = Vec::new();
        for subreddit in &self.subreddits {
            let listing = self
                .fetch_listing(&token, &credentials.user_agent, subreddit)
                .await?;
            let posts = parse_listing(&listing, subreddit)?;
            tracing::debug!(provider = PROVIDER, subreddit, count = posts.len(), "fetched hot posts");
            items.extend(posts);
        }

        Ok(items)
    }

    async fn fetch_token(&self, credentials: &RedditCredentials) -> Result<String, SourceError> {
        let url = format!("{}/api/v1/access_token", self.auth_base_url);
        let client = &self.client;
        let url = url.as_str();

        let body = retry_with_backoff(
            PROVIDER,
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            move || async move {
                let response = client
                    .post(url)
                    .header(USER_AGENT, credentials.user_agent.as_str())
                    .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
                    .form(&[("grant_type", "client_credentials")])
                    .send()
                    .await?;
                let response = check_status(PROVIDER, response)?;
                read_json(PROVIDER, response).await
            },
        )
        .await?;

        first_str(&body, &["access_token"]).ok_or_else(|| SourceError::Parse {
            provider: PROVIDER,
            message: "token response has no access_token".to_string(),
        })
    }

    async fn fetch_listing(
        &self,
        token: &str,
        user_agent: &str,
        subreddit: &str,
    ) -> Result<Value, SourceError> {
        let url = format!("{}/r/{subreddit}/hot", self.api_base_url);
        let limit = self.posts_per_subreddit.to_string();
        let client = &self.client;
        let url = url.as_str();
        let limit = limit.as_str();

        retry_with_backoff(
            PROVIDER,
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            move || async move {
                let response = client
                    .get(url)
                    .header(USER_AGENT, user_agent)
                    .bearer_auth(token)
                    .query(&[("limit", limit), ("raw_json", "1")])
                    .send()
                    .await?;
                let response = check_status(PROVIDER, response)?;
                read_json(PROVIDER, response).await
            },
        )
        .await
    }
}

/// Map a subreddit listing to source items tagged with the subreddit name.
pub(crate) fn parse_listing(listing: &Value, subreddit: &str) -> Result<Vec<SourceItem>, SourceError> {
    let children = listing
        .pointer("/data/children")
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Parse {
            provider: PROVIDER,
            message: format!("listing for r/{subreddit} has no data.children"),
        })?;

    Ok(children
        .iter()
        .filter_map(|child| child.get("data"))
        .map(|post| {
            let url = first_str(post, &["url", "url_overridden_by_dest"]).or_else(|| {
                first_str(post, &["permalink"]).map(|p| format!("{PERMALINK_BASE}{p}"))
            });
            SourceItem {
                topic: first_str(post, &["title"]),
                description: Some(format!("Subreddit: r/{subreddit}")),
                url,
                relevance_score: first_f64(post, &["score", "ups"]),
                published_at: None,
                tags: Some(subreddit.to_string()),
            }
        })
        .collect())
}
