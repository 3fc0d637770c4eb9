//! Google Trends "trending now" RSS collector.

use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;

use crate::error::SourceError;
use crate::http::{check_status, normalize_base_url, HttpSettings};
use crate::retry::retry_with_backoff;
use crate::types::SourceItem;

const DEFAULT_BASE_URL: &str = "https://trends.google.com";
const PROVIDER: &str = "google_trends";

/// Client for the public Google Trends RSS feed. Needs no credentials.
pub struct GoogleTrendsClient {
    client: Client,
    settings: HttpSettings,
    base_url: String,
    geo: String,
}

impl GoogleTrendsClient {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be constructed.
    pub fn new(settings: HttpSettings, geo: &str) -> Result<Self, SourceError> {
        Self::with_base_url(settings, geo, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be constructed.
    pub fn with_base_url(
        settings: HttpSettings,
        geo: &str,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: settings.build_client()?,
            settings,
            base_url: normalize_base_url(base_url),
            geo: geo.to_owned(),
        })
    }

    /// Fetch the current trending searches for the configured region.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] or [`SourceError::Status`] when the feed
    /// cannot be fetched after retries, or [`SourceError::Xml`] on malformed RSS.
    pub async fn fetch_trending(&self) -> Result<Vec<SourceItem>, SourceError> {
        let url = format!("{}/trending/rss", self.base_url);
        let client = &self.client;
        let url = url.as_str();
        let geo = self.geo.as_str();

        let body = retry_with_backoff(
            PROVIDER,
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            move || async move {
                let response = client.get(url).query(&[("geo", geo)]).send().await?;
                let response = check_status(PROVIDER, response)?;
                Ok::<_, SourceError>(response.text().await?)
            },
        )
        .await?;

        let items = parse_trending_rss(&body)?;
        tracing::debug!(provider = PROVIDER, geo, count = items.len(), "fetched trending searches");
        Ok(items)
    }
}

#[derive(Default)]
struct PendingItem {
    title: String,
    traffic: String,
    news_url: String,
}

impl PendingItem {
    fn into_source_item(self) -> SourceItem {
        let non_empty = |s: String| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        };
        SourceItem {
            topic: non_empty(self.title),
            description: non_empty(self.traffic).map(|t| format!("Search volume: {t}")),
            url: non_empty(self.news_url),
            relevance_score: None,
            published_at: None,
            tags: Some("search".to_string()),
        }
    }
}

/// Parse the trending RSS feed into source items, one per `<item>`.
///
/// Only the first `ht:news_item_url` of an item is kept.
///
/// # Errors
///
/// Returns [`SourceError::Xml`] if the XML is malformed.
pub(crate) fn parse_trending_rss(xml: &str) -> Result<Vec<SourceItem>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<PendingItem> = None;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "item" {
                    current = Some(PendingItem::default());
                    current_tag.clear();
                } else {
                    current_tag = name;
                }
            }
            Ok(Event::End(e)) => {
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if name == "item" {
                    if let Some(item) = current.take() {
                        items.push(item.into_source_item());
                    }
                }
                current_tag.clear();
            }
            Ok(Event::Text(e)) => {
                if let Some(item) = current.as_mut() {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    apply_field(item, &current_tag, text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(item) = current.as_mut() {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    apply_field(item, &current_tag, text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Xml(e)),
            _ => {}
        }
    }

    Ok(items)
}

fn apply_field(item: &mut PendingItem, tag: &str, text: String) {
    match tag {
        "title" => item.title = text,
        "ht:approx_traffic" => item.traffic = text,
        "ht:news_item_url" if item.news_url.is_empty() => item.news_url = text,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss xmlns:ht="https://trends.google.com/trending/rss" version="2.0">
  <channel>
    <title>Daily Search Trends</title>
    <item>
      <title>Budget 2024</title>
      <ht:approx_traffic>500+</ht:approx_traffic>
      <ht:news_item>
        <ht:news_item_title>Budget &amp; you</ht:news_item_title>
        <ht:news_item_url>https://news.example/budget</ht:news_item_url>
      </ht:news_item>
      <ht:news_item>
        <ht:news_item_url>https://news.example/second</ht:news_item_url>
      </ht:news_item>
    </item>
    <item>
      <title><![CDATA[Cricket WC]]></title>
    </item>
    <item>
      <title>   </title>
      <ht:approx_traffic>10+</ht:approx_traffic>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_with_traffic_and_first_news_url() {
        let items = parse_trending_rss(FEED).expect("parse");
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].topic.as_deref(), Some("Budget 2024"));
        assert_eq!(items[0].description.as_deref(), Some("Search volume: 500+"));
        assert_eq!(items[0].url.as_deref(), Some("https://news.example/budget"));
        assert_eq!(items[0].tags.as_deref(), Some("search"));
        assert!(items[0].relevance_score.is_none());
    }

    #[test]
    fn channel_title_is_not_an_item() {
        let items = parse_trending_rss(FEED).expect("parse");
        assert!(items
            .iter()
            .all(|i| i.topic.as_deref() != Some("Daily Search Trends")));
    }

    #[test]
    fn cdata_titles_and_blank_titles() {
        let items = parse_trending_rss(FEED).expect("parse");
        assert_eq!(items[1].topic.as_deref(), Some("Cricket WC"));
        assert!(items[1].description.is_none());
        assert!(items[1].url.is_none());
        assert!(items[2].topic.is_none());
    }

    #[test]
    fn empty_channel_yields_no_items() {
        let items = parse_trending_rss("<rss><channel></channel></rss>").expect("parse");
        assert!(items.is_empty());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = parse_trending_rss("<rss><channel><item><title>x</wrong></item>").unwrap_err();
        assert!(matches!(err, SourceError::Xml(_)));
    }
}
