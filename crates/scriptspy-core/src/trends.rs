//! Trend records, topic normalization, and cross-source deduplication.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// The kind of provider a trend was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendSource {
    Search,
    News,
    Discussion,
}

impl TrendSource {
    pub const ALL: [TrendSource; 3] = [
        TrendSource::Search,
        TrendSource::News,
        TrendSource::Discussion,
    ];

    /// The value stored in the `trends.source` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TrendSource::Search => "search",
            TrendSource::News => "news",
            TrendSource::Discussion => "discussion",
        }
    }
}

impl fmt::Display for TrendSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Ok(TrendSource::Search),
            "news" => Ok(TrendSource::News),
            "discussion" => Ok(TrendSource::Discussion),
            other => Err(CoreError::InvalidTrendSource(other.to_string())),
        }
    }
}

/// A trend ready for persistence. `id` is assigned by the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrend {
    pub source: TrendSource,
    pub topic: String,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Opaque, source-scoped value (search volume, upvotes, ...). Not
    /// comparable across sources.
    pub relevance_score: Option<f64>,
    pub fetched_at: DateTime<Utc>,
    pub tags: Option<String>,
}

impl NewTrend {
    /// The dedup key for this trend.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        normalize_topic(&self.topic)
    }
}

/// Canonicalize a topic for duplicate comparison: lower-case, collapse
/// whitespace runs to a single space, trim.
#[must_use]
pub fn normalize_topic(topic: &str) -> String {
    topic
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep the first trend seen for each normalized topic, in encounter order.
///
/// Later duplicates never replace an earlier one, whatever their source.
/// Trends whose topic normalizes to the empty string are dropped.
#[must_use]
pub fn dedupe_by_topic(mut candidates: Vec<NewTrend>) -> Vec<NewTrend> {
    let mut seen: HashSet<String> = HashSet::with_capacity(candidates.len());
    candidates.retain(|trend| {
        let key = trend.dedup_key();
        !key.is_empty() && seen.insert(key)
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(source: TrendSource, topic: &str) -> NewTrend {
        NewTrend {
            source,
            topic: topic.to_string(),
            description: None,
            url: None,
            relevance_score: None,
            fetched_at: Utc::now(),
            tags: None,
        }
    }

    #[test]
    fn normalize_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize_topic("  AI   Boom\t2024 \n"), "ai boom 2024");
        assert_eq!(normalize_topic("Cricket WC"), "cricket wc");
    }

    #[test]
    fn normalize_of_blank_is_empty() {
        assert_eq!(normalize_topic(""), "");
        assert_eq!(normalize_topic(" \t\n "), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            "   ",
            "AI Boom",
            "ai   boom",
            "\tBudget\u{00a0}2024  LIVE ",
            "Ünïcödé   TOPIC",
            "मुंबई  बारिश",
            "ΣΊΣΥΦΟΣ  mixed\r\ncase",
        ];
        for sample in samples {
            let once = normalize_topic(sample);
            assert_eq!(normalize_topic(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn dedupe_keeps_first_writer() {
        let candidates = vec![
            trend(TrendSource::Search, "AI Boom"),
            trend(TrendSource::Discussion, "ai   boom"),
        ];
        let result = dedupe_by_topic(candidates);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].topic, "AI Boom");
        assert_eq!(result[0].source, TrendSource::Search);
    }

    #[test]
    fn dedupe_does_not_let_later_sources_overwrite() {
        let mut news = trend(TrendSource::News, "cricket wc");
        news.relevance_score = Some(99.0);
        let candidates = vec![
            trend(TrendSource::Search, "Cricket WC"),
            news,
            trend(TrendSource::Discussion, "CRICKET  WC"),
        ];
        let result = dedupe_by_topic(candidates);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source, TrendSource::Search);
        assert!(result[0].relevance_score.is_none());
    }

    #[test]
    fn dedupe_produces_unique_keys_and_preserves_order() {
        let candidates = vec![
            trend(TrendSource::Search, "Budget 2024"),
            trend(TrendSource::News, "budget 2024 live updates"),
            trend(TrendSource::News, "Monsoon"),
            trend(TrendSource::Discussion, " budget   2024"),
            trend(TrendSource::Discussion, "monsoon "),
            trend(TrendSource::Discussion, "   "),
        ];
        let result = dedupe_by_topic(candidates);
        let keys: Vec<String> = result.iter().map(NewTrend::dedup_key).collect();
        assert_eq!(
            keys,
            vec!["budget 2024", "budget 2024 live updates", "monsoon"]
        );
        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn dedupe_of_empty_list_is_empty() {
        assert!(dedupe_by_topic(Vec::new()).is_empty());
    }

    #[test]
    fn trend_source_round_trips_through_str() {
        for source in TrendSource::ALL {
            assert_eq!(source.as_str().parse::<TrendSource>(), Ok(source));
        }
        assert_eq!(" News ".parse::<TrendSource>(), Ok(TrendSource::News));
        assert_eq!(
            "google".parse::<TrendSource>(),
            Err(CoreError::InvalidTrendSource("google".to_string()))
        );
    }

    #[test]
    fn trend_source_serializes_lowercase() {
        let json = serde_json::to_string(&TrendSource::Discussion).expect("serialize");
        assert_eq!(json, "\"discussion\"");
    }
}
