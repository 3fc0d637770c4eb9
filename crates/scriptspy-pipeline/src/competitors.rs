//! Competitor post checks: fetch each tracked profile, persist unseen posts,
//! then alert on what was actually stored.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use scriptspy_core::AppConfig;
use scriptspy_db::{CompetitorPostRow, CompetitorRow, NewCompetitorPost};
use scriptspy_sources::{HttpSettings, InstagramClient, InstagramPost, SourceError};
use sqlx::PgPool;

use crate::alert::format_post_alert;
use crate::error::PipelineError;
use crate::notifier::TelegramNotifier;

const PROVIDER: &str = "apify";

/// Outcome counters for one competitor run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompetitorCheckSummary {
    pub competitors_checked: usize,
    pub competitors_failed: usize,
    pub new_posts: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

pub struct CompetitorChecker {
    client: InstagramClient,
    notifier: TelegramNotifier,
}

impl CompetitorChecker {
    #[must_use]
    pub fn new(client: InstagramClient, notifier: TelegramNotifier) -> Self {
        Self { client, notifier }
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::SourceUnavailable`] or [`PipelineError::Notifier`]
    /// if an HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let settings =
            HttpSettings::from_app_config(config).with_timeout(config.apify_timeout_secs);
        let client = InstagramClient::new(
            settings,
            config.apify_api_key.clone(),
            config.apify_results_limit,
        )
        .map_err(|e| PipelineError::source_unavailable(PROVIDER, e))?;
        let notifier = TelegramNotifier::from_app_config(config)?;
        Ok(Self::new(client, notifier))
    }

    /// Check every tracked competitor.
    ///
    /// Each competitor is handled independently: a fetch or persistence
    /// failure is logged and counted, and the remaining competitors are still
    /// checked. Alerts are sent only after a competitor's posts are committed,
    /// once per inserted row, and delivery failures never undo the commit.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SourceUnavailable`] if the Apify key is not
    /// configured, or [`PipelineError::Persistence`] if competitors cannot be
    /// listed.
    pub async fn check_all(&self, pool: &PgPool) -> Result<CompetitorCheckSummary, PipelineError> {
        if !self.client.has_credentials() {
            return Err(PipelineError::source_unavailable(
                PROVIDER,
                SourceError::MissingCredentials {
                    provider: PROVIDER,
                    vars: "APIFY_API_KEY",
                },
            ));
        }

        let competitors = scriptspy_db::list_competitors(pool).await?;
        let mut summary = CompetitorCheckSummary::default();

        if competitors.is_empty() {
            tracing::info!("no competitors tracked; skipping");
            return Ok(summary);
        }

        for competitor in &competitors {
            let inserted = match self.check_competitor(pool, competitor, Utc::now()).await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!(
                        competitor = %competitor.handle,
                        error = %e,
                        "competitor check failed"
                    );
                    summary.competitors_failed += 1;
                    continue;
                }
            };

            summary.competitors_checked += 1;
            summary.new_posts += inserted.len();
            tracing::info!(
                competitor = %competitor.handle,
                new_posts = inserted.len(),
                "competitor checked"
            );

            for row in &inserted {
                let message = format_post_alert(&competitor.handle, row, Utc::now());
                match self.notifier.notify(&message).await {
                    Ok(()) if self.notifier.is_enabled() => summary.notifications_sent += 1,
                    Ok(()) => {}
                    Err(e) => {
                        tracing::warn!(
                            competitor = %competitor.handle,
                            post_url = %row.post_url,
                            error = %e,
                            "failed to send new post alert"
                        );
                        summary.notifications_failed += 1;
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Fetch one competitor's posts and commit the unseen ones together with
    /// the `last_checked_at` watermark. Returns only the rows inserted.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SourceUnavailable`] if the fetch fails, or
    /// [`PipelineError::Persistence`] if the lookup or the write fails.
    pub async fn check_competitor(
        &self,
        pool: &PgPool,
        competitor: &CompetitorRow,
        now: DateTime<Utc>,
    ) -> Result<Vec<CompetitorPostRow>, PipelineError> {
        let posts = self
            .client
            .fetch_recent_posts(&competitor.handle)
            .await
            .map_err(|e| PipelineError::source_unavailable(PROVIDER, e))?;

        let known: HashSet<String> = scriptspy_db::list_competitor_post_urls(pool, competitor.id)
            .await?
            .into_iter()
            .collect();

        let unseen = select_unseen_posts(posts, &known, now);
        tracing::debug!(
            competitor = %competitor.handle,
            unseen = unseen.len(),
            "selected unseen posts"
        );

        let inserted =
            scriptspy_db::record_competitor_check(pool, competitor.id, &unseen, now).await?;
        Ok(inserted)
    }
}

/// Posts whose URL is neither already stored nor repeated earlier in `posts`.
#[must_use]
pub fn select_unseen_posts(
    posts: Vec<InstagramPost>,
    known: &HashSet<String>,
    detected_at: DateTime<Utc>,
) -> Vec<NewCompetitorPost> {
    let mut seen = HashSet::new();
    posts
        .into_iter()
        .filter(|post| !known.contains(&post.post_url) && seen.insert(post.post_url.clone()))
        .map(|post| NewCompetitorPost {
            post_url: post.post_url,
            caption: post.caption,
            post_type: post.post_type,
            posted_at: post.posted_at,
            detected_at,
            is_new: true,
        })
        .collect()
}
