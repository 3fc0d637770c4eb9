use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_SUBREDDITS: &str = "india,indiainvestments,bollywood,technology";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Provider credentials: an empty value counts as absent.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_timeout = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let secs = parse_u64(var, default)?;
        if secs == 0 {
            return Err(invalid(var, "timeout must be at least 1 second".to_string()));
        }
        Ok(secs)
    };

    let parse_interval = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let mins = parse_u64(var, default)?;
        if mins == 0 {
            return Err(invalid(var, "interval must be at least 1 minute".to_string()));
        }
        Ok(mins)
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("SCRIPTSPY_ENV", "development"))?;
    let bind_addr = parse_addr("SCRIPTSPY_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SCRIPTSPY_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("SCRIPTSPY_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SCRIPTSPY_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SCRIPTSPY_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let http_timeout_secs = parse_timeout("SCRIPTSPY_HTTP_TIMEOUT_SECS", "30")?;
    let apify_timeout_secs = parse_timeout("SCRIPTSPY_APIFY_TIMEOUT_SECS", "60")?;
    let http_user_agent = or_default(
        "SCRIPTSPY_HTTP_USER_AGENT",
        "scriptspy/0.1 (trend-research)",
    );
    let source_max_retries = parse_u32("SCRIPTSPY_SOURCE_MAX_RETRIES", "2")?;
    let source_retry_backoff_ms = parse_u64("SCRIPTSPY_SOURCE_RETRY_BACKOFF_MS", "500")?;

    let trend_interval_mins = parse_interval("SCRIPTSPY_TREND_INTERVAL_MINS", "240")?;
    let competitor_interval_mins = parse_interval("SCRIPTSPY_COMPETITOR_INTERVAL_MINS", "30")?;

    let google_trends_geo = or_default("SCRIPTSPY_GOOGLE_TRENDS_GEO", "IN");
    let news_api_key = optional("NEWSAPI_KEY");
    let news_country = or_default("SCRIPTSPY_NEWS_COUNTRY", "in");

    let reddit_client_id = optional("REDDIT_CLIENT_ID");
    let reddit_client_secret = optional("REDDIT_CLIENT_SECRET");
    let reddit_user_agent = or_default("REDDIT_USER_AGENT", "script-research-tool/1.0");
    let reddit_subreddits = parse_list(&or_default("SCRIPTSPY_REDDIT_SUBREDDITS", DEFAULT_SUBREDDITS));
    let reddit_posts_per_subreddit = parse_u32("SCRIPTSPY_REDDIT_POSTS_PER_SUBREDDIT", "20")?;

    let apify_api_key = optional("APIFY_API_KEY");
    let apify_results_limit = parse_u32("SCRIPTSPY_APIFY_RESULTS_LIMIT", "12")?;

    let telegram_bot_token = optional("TELEGRAM_BOT_TOKEN");
    let telegram_chat_id = optional("TELEGRAM_CHAT_ID");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        apify_timeout_secs,
        http_user_agent,
        source_max_retries,
        source_retry_backoff_ms,
        trend_interval_mins,
        competitor_interval_mins,
        google_trends_geo,
        news_api_key,
        news_country,
        reddit_client_id,
        reddit_client_secret,
        reddit_user_agent,
        reddit_subreddits,
        reddit_posts_per_subreddit,
        apify_api_key,
        apify_results_limit,
        telegram_bot_token,
        telegram_chat_id,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SCRIPTSPY_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

/// Split a comma-separated list, dropping blank entries.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
