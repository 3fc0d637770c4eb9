//! Trend command handlers for the CLI.

use std::str::FromStr;

use clap::Subcommand;
use scriptspy_core::{AppConfig, TrendSource};
use scriptspy_db::TriggerSource;
use scriptspy_pipeline::TrendAggregator;

/// Sub-commands available under `trends`.
#[derive(Debug, Subcommand)]
pub enum TrendsCommands {
    /// Fetch every trend source once and store the deduplicated topics
    Run,
    /// Show the most recently stored trends
    List {
        /// Filter by source (search, news, discussion)
        #[arg(long)]
        source: Option<String>,
        /// Maximum number of trends to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

/// Run one trend aggregation pass, recorded in the run ledger as a CLI run.
///
/// # Errors
///
/// Returns an error if any source fails or the trends cannot be stored.
pub(crate) async fn run_trends_collect(
    pool: &sqlx::PgPool,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let aggregator = TrendAggregator::from_config(config)?;
    let stored = scriptspy_pipeline::run_trend_job(pool, &aggregator, TriggerSource::Cli).await?;
    println!("stored {stored} trend(s)");
    Ok(())
}

/// # Errors
///
/// Returns an error if `source` is not a known trend source or the query fails.
pub(crate) async fn run_trends_list(
    pool: &sqlx::PgPool,
    source: Option<&str>,
    limit: i64,
) -> anyhow::Result<()> {
    let source = source.map(TrendSource::from_str).transpose()?;
    let trends = scriptspy_db::list_trends(pool, source, limit.clamp(1, 200)).await?;

    if trends.is_empty() {
        println!("no trends stored yet; run `trends run` first");
        return Ok(());
    }

    println!("{:<18}{:<12}{:<10}TOPIC", "FETCHED", "SOURCE", "SCORE");
    for trend in &trends {
        let score = trend
            .relevance_score
            .map_or_else(|| "\u{2014}".to_string(), |s| format!("{s:.0}"));
        println!(
            "{:<18}{:<12}{:<10}{}",
            crate::fmt_time(Some(trend.fetched_at)),
            trend.source,
            score,
            crate::truncate_chars(&trend.topic, 70)
        );
    }

    Ok(())
}
