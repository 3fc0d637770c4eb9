//! Integration tests for the source clients using wiremock HTTP mocks.

use scriptspy_core::TrendSource;
use scriptspy_sources::{
    GoogleTrendsClient, HttpSettings, InstagramClient, NewsClient, RedditClient,
    RedditCredentials, SourceError, TrendAdapter,
};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(max_retries: u32) -> HttpSettings {
    HttpSettings {
        timeout_secs: 5,
        user_agent: "scriptspy-test".to_string(),
        max_retries,
        backoff_base_ms: 0,
    }
}

const TRENDS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss xmlns:ht="https://trends.google.com/trending/rss" version="2.0">
  <channel>
    <item>
      <title>Cricket WC</title>
      <ht:approx_traffic>2000+</ht:approx_traffic>
      <ht:news_item><ht:news_item_url>https://news.example/cwc</ht:news_item_url></ht:news_item>
    </item>
    <item><title>Budget 2024</title></item>
  </channel>
</rss>"#;

// ---------------------------------------------------------------------------
// Google Trends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn google_trends_parses_feed_for_region() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trending/rss"))
        .and(query_param("geo", "IN"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRENDS_FEED))
        .expect(1)
        .mount(&server)
        .await;

    let client = GoogleTrendsClient::with_base_url(settings(0), "IN", &server.uri())
        .expect("client construction should not fail");
    let items = client.fetch_trending().await.expect("fetch");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].topic.as_deref(), Some("Cricket WC"));
    assert_eq!(items[0].description.as_deref(), Some("Search volume: 2000+"));
    assert_eq!(items[0].url.as_deref(), Some("https://news.example/cwc"));
    assert_eq!(items[1].topic.as_deref(), Some("Budget 2024"));
}

#[tokio::test]
async fn google_trends_retries_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trending/rss"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trending/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRENDS_FEED))
        .expect(1)
        .mount(&server)
        .await;

    let client = GoogleTrendsClient::with_base_url(settings(2), "IN", &server.uri())
        .expect("client construction should not fail");
    let items = client.fetch_trending().await.expect("fetch after retry");
    assert_eq!(items.len(), 2);
}

// ---------------------------------------------------------------------------
// NewsAPI
// ---------------------------------------------------------------------------

fn articles(titles: &[&str]) -> serde_json::Value {
    let articles: Vec<serde_json::Value> = titles
        .iter()
        .map(|t| serde_json::json!({"title": t, "url": format!("https://news.example/{}", t.len())}))
        .collect();
    serde_json::json!({"status": "ok", "totalResults": articles.len(), "articles": articles})
}

#[tokio::test]
async fn news_fetches_general_then_each_category() {
    let server = MockServer::start().await;

    for (category, title) in [
        ("technology", "AI Boom"),
        ("business", "Budget 2024 live updates"),
        ("entertainment", "Box office"),
    ] {
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(query_param("category", category))
            .and(query_param("apiKey", "news-key"))
            .and(query_param("country", "in"))
            .and(query_param("pageSize", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(articles(&[title])))
            .expect(1)
            .mount(&server)
            .await;
    }
    // Mounted last so the category-specific mocks take precedence.
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles(&["Monsoon"])))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsClient::with_base_url(
        settings(0),
        Some("news-key".to_string()),
        "in",
        &server.uri(),
    )
    .expect("client construction should not fail");
    let items = client.fetch_top_headlines().await.expect("fetch");

    let topics: Vec<&str> = items.iter().filter_map(|i| i.topic.as_deref()).collect();
    assert_eq!(
        topics,
        vec!["Monsoon", "AI Boom", "Budget 2024 live updates", "Box office"]
    );
    let tags: Vec<&str> = items.iter().filter_map(|i| i.tags.as_deref()).collect();
    assert_eq!(tags, vec!["general", "technology", "business", "entertainment"]);
}

#[tokio::test]
async fn news_without_key_fails_without_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = NewsClient::with_base_url(settings(0), None, "in", &server.uri())
        .expect("client construction should not fail");
    let err = client.fetch_top_headlines().await.unwrap_err();
    assert!(matches!(
        err,
        SourceError::MissingCredentials {
            vars: "NEWSAPI_KEY",
            ..
        }
    ));
}

#[tokio::test]
async fn news_unauthorized_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "status": "error", "code": "apiKeyInvalid"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsClient::with_base_url(
        settings(3),
        Some("bad-key".to_string()),
        "in",
        &server.uri(),
    )
    .expect("client construction should not fail");
    let err = client.fetch_top_headlines().await.unwrap_err();
    assert!(matches!(err, SourceError::Status { status: 401, .. }));
}

// ---------------------------------------------------------------------------
// Reddit
// ---------------------------------------------------------------------------

fn reddit_credentials() -> RedditCredentials {
    RedditCredentials {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        user_agent: "script-research-tool/1.0".to_string(),
    }
}

#[tokio::test]
async fn reddit_exchanges_token_then_reads_each_subreddit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(header("user-agent", "script-research-tool/1.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access_token": "tok", "token_type": "bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    for (subreddit, title, score) in [("india", "Cricket WC", 900), ("bollywood", "New release", 40)] {
        Mock::given(method("GET"))
            .and(path(format!("/r/{subreddit}/hot")))
            .and(header("authorization", "Bearer tok"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "Listing",
                "data": { "children": [ { "kind": "t3", "data": { "title": title, "score": score, "url": "https://example.com" } } ] }
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = RedditClient::with_base_urls(
        settings(0),
        Some(reddit_credentials()),
        vec!["india".to_string(), "bollywood".to_string()],
        20,
        &server.uri(),
        &server.uri(),
    )
    .expect("client construction should not fail");
    let items = client.fetch_hot_posts().await.expect("fetch");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].topic.as_deref(), Some("Cricket WC"));
    assert_eq!(items[0].relevance_score, Some(900.0));
    assert_eq!(items[1].tags.as_deref(), Some("bollywood"));
    assert_eq!(items[1].description.as_deref(), Some("Subreddit: r/bollywood"));
}

#[tokio::test]
async fn reddit_token_rejection_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = RedditClient::with_base_urls(
        settings(2),
        Some(reddit_credentials()),
        vec!["india".to_string()],
        20,
        &server.uri(),
        &server.uri(),
    )
    .expect("client construction should not fail");
    let err = client.fetch_hot_posts().await.unwrap_err();
    assert!(matches!(err, SourceError::Status { status: 401, .. }));
}

#[tokio::test]
async fn reddit_without_credentials_is_missing_credentials() {
    let client = RedditClient::with_base_urls(
        settings(0),
        None,
        vec!["india".to_string()],
        20,
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
    )
    .expect("client construction should not fail");
    let err = client.fetch_hot_posts().await.unwrap_err();
    assert!(matches!(err, SourceError::MissingCredentials { provider: "reddit", .. }));
}

// ---------------------------------------------------------------------------
// Apify Instagram
// ---------------------------------------------------------------------------

#[tokio::test]
async fn instagram_runs_actor_for_stripped_handle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/v2/acts/apify~instagram-profile-scraper/run-sync-get-dataset-items",
        ))
        .and(query_param("token", "apify-key"))
        .and(query_param("clean", "true"))
        .and(body_partial_json(serde_json::json!({
            "usernames": ["acme"],
            "resultsLimit": 12,
            "resultsType": "posts"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "url": "https://www.instagram.com/p/A1/", "caption": "hello", "type": "Image" },
            { "postUrl": "https://www.instagram.com/p/B2/", "productType": "clips" },
            { "caption": "no url" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = InstagramClient::with_base_url(
        settings(0),
        Some("apify-key".to_string()),
        12,
        &server.uri(),
    )
    .expect("client construction should not fail");
    let posts = client.fetch_recent_posts("@acme").await.expect("fetch");

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].post_url, "https://www.instagram.com/p/A1/");
    assert_eq!(posts[1].post_type.as_deref(), Some("clips"));
}

#[tokio::test]
async fn instagram_gives_up_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let client = InstagramClient::with_base_url(
        settings(1),
        Some("apify-key".to_string()),
        12,
        &server.uri(),
    )
    .expect("client construction should not fail");
    let err = client.fetch_recent_posts("acme").await.unwrap_err();
    assert!(matches!(err, SourceError::Status { status: 502, .. }));
}

#[tokio::test]
async fn instagram_without_key_is_missing_credentials() {
    let client = InstagramClient::with_base_url(settings(0), None, 12, "http://127.0.0.1:9")
        .expect("client construction should not fail");
    let err = client.fetch_recent_posts("acme").await.unwrap_err();
    assert!(matches!(
        err,
        SourceError::MissingCredentials {
            vars: "APIFY_API_KEY",
            ..
        }
    ));
}

// ---------------------------------------------------------------------------
// TrendAdapter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn adapter_reports_source_and_delegates_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trending/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRENDS_FEED))
        .mount(&server)
        .await;

    let adapter = TrendAdapter::Search(
        GoogleTrendsClient::with_base_url(settings(0), "IN", &server.uri())
            .expect("client construction should not fail"),
    );
    assert_eq!(adapter.source(), TrendSource::Search);
    assert_eq!(adapter.provider(), "google_trends");
    assert_eq!(adapter.fetch().await.expect("fetch").len(), 2);
}
