use chrono::{DateTime, Utc};
use serde::Serialize;

/// One raw item from a trend source, before it is turned into a trend.
///
/// `topic` stays optional here: providers routinely return items without a
/// usable title, and the aggregator decides what to drop.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceItem {
    pub topic: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub relevance_score: Option<f64>,
    pub published_at: Option<DateTime<Utc>>,
    pub tags: Option<String>,
}

/// A post scraped from an Instagram profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstagramPost {
    pub post_url: String,
    pub caption: Option<String>,
    pub post_type: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
}
