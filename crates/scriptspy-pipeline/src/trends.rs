//! Trend aggregation: fetch every source, normalize, dedupe, persist.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use scriptspy_core::{dedupe_by_topic, AppConfig, NewTrend, TrendSource};
use scriptspy_db::TrendRow;
use scriptspy_sources::{SourceItem, TrendAdapter};
use sqlx::PgPool;

use crate::error::PipelineError;

/// Runs one aggregation pass over a fixed, ordered set of trend sources.
///
/// The run is all-or-nothing: if any source fails, nothing is persisted.
pub struct TrendAggregator {
    adapters: Vec<TrendAdapter>,
}

impl TrendAggregator {
    /// Adapters are consulted in the given order; earlier adapters win ties
    /// during deduplication.
    #[must_use]
    pub fn new(adapters: Vec<TrendAdapter>) -> Self {
        Self { adapters }
    }

    /// Build the production search, news, and discussion adapters.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SourceUnavailable`] if an HTTP client cannot
    /// be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let adapters = TrendAdapter::all_from_config(config)
            .map_err(|e| PipelineError::source_unavailable("http_client", e))?;
        Ok(Self::new(adapters))
    }

    /// Fetch all sources concurrently and return deduplicated trends in
    /// encounter order (adapter order, then each adapter's item order).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SourceUnavailable`] for the first adapter, in
    /// adapter order, that failed.
    pub async fn collect(&self, now: DateTime<Utc>) -> Result<Vec<NewTrend>, PipelineError> {
        let results = join_all(self.adapters.iter().map(|adapter| adapter.fetch())).await;

        let mut candidates = Vec::new();
        for (adapter, result) in self.adapters.iter().zip(results) {
            let items = result.map_err(|e| {
                tracing::warn!(provider = adapter.provider(), error = %e, "trend source failed");
                PipelineError::source_unavailable(adapter.provider(), e)
            })?;
            tracing::debug!(
                provider = adapter.provider(),
                count = items.len(),
                "trend source returned items"
            );
            candidates.extend(to_new_trends(adapter.source(), items, now));
        }

        let fetched = candidates.len();
        let unique = dedupe_by_topic(candidates);
        tracing::info!(fetched, unique = unique.len(), "collected trends");
        Ok(unique)
    }

    /// Collect trends and persist the survivors in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SourceUnavailable`] if any source fails, or
    /// [`PipelineError::Persistence`] if the write fails. Nothing is
    /// committed in either case.
    pub async fn aggregate_and_store(&self, pool: &PgPool) -> Result<Vec<TrendRow>, PipelineError> {
        let trends = self.collect(Utc::now()).await?;
        if trends.is_empty() {
            tracing::info!("no new trends to store");
            return Ok(Vec::new());
        }
        let rows = scriptspy_db::insert_trends(pool, &trends).await?;
        tracing::info!(count = rows.len(), "stored trends");
        Ok(rows)
    }
}

/// Turn raw source items into trends, dropping items without a usable topic.
///
/// `fetched_at` is the run time, except news items keep their publication
/// time when the provider reports one.
#[must_use]
pub fn to_new_trends(source: TrendSource, items: Vec<SourceItem>, now: DateTime<Utc>) -> Vec<NewTrend> {
    items
        .into_iter()
        .filter_map(|item| {
            let topic = item.topic.filter(|t| !t.trim().is_empty())?;
            let fetched_at = match source {
                TrendSource::News => item.published_at.unwrap_or(now),
                TrendSource::Search | TrendSource::Discussion => now,
            };
            Some(NewTrend {
                source,
                topic,
                description: item.description,
                url: item.url,
                relevance_score: item.relevance_score,
                fetched_at,
                tags: item.tags,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn item(topic: Option<&str>) -> SourceItem {
        SourceItem {
            topic: topic.map(ToOwned::to_owned),
            ..SourceItem::default()
        }
    }

    #[test]
    fn items_without_topic_are_discarded() {
        let now = Utc::now();
        let trends = to_new_trends(
            TrendSource::Discussion,
            vec![item(None), item(Some("  ")), item(Some("Cricket WC"))],
            now,
        );
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].topic, "Cricket WC");
        assert_eq!(trends[0].source, TrendSource::Discussion);
        assert_eq!(trends[0].fetched_at, now);
    }

    #[test]
    fn news_keeps_publication_time() {
        let now = Utc.with_ymd_and_hms(2024, 7, 23, 12, 0, 0).unwrap();
        let published = now - Duration::hours(3);
        let mut dated = item(Some("Budget 2024 live updates"));
        dated.published_at = Some(published);

        let trends = to_new_trends(TrendSource::News, vec![dated.clone(), item(Some("Undated"))], now);
        assert_eq!(trends[0].fetched_at, published);
        assert_eq!(trends[1].fetched_at, now);

        let search = to_new_trends(TrendSource::Search, vec![dated], now);
        assert_eq!(search[0].fetched_at, now);
    }

    #[test]
    fn relevance_score_passes_through_unchanged() {
        let mut scored = item(Some("AI Boom"));
        scored.relevance_score = Some(1520.0);
        let trends = to_new_trends(TrendSource::Discussion, vec![scored], Utc::now());
        assert_eq!(trends[0].relevance_score, Some(1520.0));
    }

    #[tokio::test]
    async fn no_adapters_collects_nothing() {
        let aggregator = TrendAggregator::new(Vec::new());
        assert!(aggregator.collect(Utc::now()).await.expect("collect").is_empty());
    }
}
