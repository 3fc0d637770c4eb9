//! A uniform fetch interface over the trend sources.

use scriptspy_core::{AppConfig, TrendSource};

use crate::error::SourceError;
use crate::google_trends::GoogleTrendsClient;
use crate::http::HttpSettings;
use crate::news::NewsClient;
use crate::reddit::{RedditClient, RedditCredentials};
use crate::types::SourceItem;

/// One configured trend source.
pub enum TrendAdapter {
    Search(GoogleTrendsClient),
    News(NewsClient),
    Discussion(RedditClient),
}

impl TrendAdapter {
    /// Build the three production adapters in aggregation order: search,
    /// news, discussion.
    ///
    /// Missing credentials do not fail construction; the affected adapter
    /// reports [`SourceError::MissingCredentials`] when fetched.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if an HTTP client cannot be constructed.
    pub fn all_from_config(config: &AppConfig) -> Result<Vec<TrendAdapter>, SourceError> {
        let settings = HttpSettings::from_app_config(config);

        let reddit_credentials = match (&config.reddit_client_id, &config.reddit_client_secret) {
            (Some(client_id), Some(client_secret)) => Some(RedditCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                user_agent: config.reddit_user_agent.clone(),
            }),
            _ => None,
        };

        Ok(vec![
            TrendAdapter::Search(GoogleTrendsClient::new(
                settings.clone(),
                &config.google_trends_geo,
            )?),
            TrendAdapter::News(NewsClient::new(
                settings.clone(),
                config.news_api_key.clone(),
                &config.news_country,
            )?),
            TrendAdapter::Discussion(RedditClient::new(
                settings,
                reddit_credentials,
                config.reddit_subreddits.clone(),
                config.reddit_posts_per_subreddit,
            )?),
        ])
    }

    /// The trend source every item from this adapter is attributed to.
    #[must_use]
    pub fn source(&self) -> TrendSource {
        match self {
            TrendAdapter::Search(_) => TrendSource::Search,
            TrendAdapter::News(_) => TrendSource::News,
            TrendAdapter::Discussion(_) => TrendSource::Discussion,
        }
    }

    /// Provider name used in logs and errors.
    #[must_use]
    pub fn provider(&self) -> &'static str {
        match self {
            TrendAdapter::Search(_) => "google_trends",
            TrendAdapter::News(_) => "newsapi",
            TrendAdapter::Discussion(_) => "reddit",
        }
    }

    /// Fetch the current items from this source. Zero items is a valid result.
    ///
    /// # Errors
    ///
    /// Returns the underlying client's [`SourceError`].
    pub async fn fetch(&self) -> Result<Vec<SourceItem>, SourceError> {
        match self {
            TrendAdapter::Search(client) => client.fetch_trending().await,
            TrendAdapter::News(client) => client.fetch_top_headlines().await,
            TrendAdapter::Discussion(client) => client.fetch_hot_posts().await,
        }
    }
}
