use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub apify_timeout_secs: u64,
    pub http_user_agent: String,
    pub source_max_retries: u32,
    pub source_retry_backoff_ms: u64,
    pub trend_interval_mins: u64,
    pub competitor_interval_mins: u64,
    pub google_trends_geo: String,
    pub news_api_key: Option<String>,
    pub news_country: String,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_user_agent: String,
    pub reddit_subreddits: Vec<String>,
    pub reddit_posts_per_subreddit: u32,
    pub apify_api_key: Option<String>,
    pub apify_results_limit: u32,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

fn redact(value: Option<&String>) -> Option<&'static str> {
    value.map(|_| "[redacted]")
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("apify_timeout_secs", &self.apify_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .field("source_max_retries", &self.source_max_retries)
            .field("source_retry_backoff_ms", &self.source_retry_backoff_ms)
            .field("trend_interval_mins", &self.trend_interval_mins)
            .field("competitor_interval_mins", &self.competitor_interval_mins)
            .field("google_trends_geo", &self.google_trends_geo)
            .field("news_api_key", &redact(self.news_api_key.as_ref()))
            .field("news_country", &self.news_country)
            .field("reddit_client_id", &redact(self.reddit_client_id.as_ref()))
            .field(
                "reddit_client_secret",
                &redact(self.reddit_client_secret.as_ref()),
            )
            .field("reddit_user_agent", &self.reddit_user_agent)
            .field("reddit_subreddits", &self.reddit_subreddits)
            .field(
                "reddit_posts_per_subreddit",
                &self.reddit_posts_per_subreddit,
            )
            .field("apify_api_key", &redact(self.apify_api_key.as_ref()))
            .field("apify_results_limit", &self.apify_results_limit)
            .field(
                "telegram_bot_token",
                &redact(self.telegram_bot_token.as_ref()),
            )
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}
