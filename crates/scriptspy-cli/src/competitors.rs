//! Competitor command handlers for the CLI.
//!
//! `check` runs the same pipeline as the scheduler, recorded as a CLI run;
//! the remaining subcommands manage the tracked list directly.

use clap::Subcommand;
use scriptspy_core::AppConfig;
use scriptspy_db::{DbError, TriggerSource};
use scriptspy_pipeline::CompetitorChecker;

/// Sub-commands available under `competitors`.
#[derive(Debug, Subcommand)]
pub enum CompetitorsCommands {
    /// Start tracking an Instagram account
    Add {
        /// Display name
        name: String,
        /// Instagram handle (a leading @ is ignored)
        handle: String,
    },
    /// Show tracked accounts
    List,
    /// Stop tracking an account and delete its stored posts
    Remove {
        /// Competitor id as shown by `competitors list`
        id: i64,
    },
    /// Check every tracked account for new posts now
    Check,
    /// Show stored posts for one account
    Posts {
        /// Competitor id as shown by `competitors list`
        id: i64,
        /// Maximum number of posts to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

/// # Errors
///
/// Returns an error if the handle is blank, already tracked, or the insert fails.
pub(crate) async fn run_competitors_add(
    pool: &sqlx::PgPool,
    name: &str,
    handle: &str,
) -> anyhow::Result<()> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("competitor name must not be empty");
    }
    let handle = scriptspy_core::competitors::validate_handle(handle)?;

    if let Some(existing) = scriptspy_db::get_competitor_by_handle(pool, &handle).await? {
        anyhow::bail!("@{handle} is already tracked (id {})", existing.id);
    }

    match scriptspy_db::create_competitor(pool, name, &handle).await {
        Ok(row) => {
            println!("tracking @{} (id {})", row.handle, row.id);
            Ok(())
        }
        Err(e) if e.is_unique_violation() => {
            anyhow::bail!("@{handle} is already tracked")
        }
        Err(e) => Err(e.into()),
    }
}

/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_competitors_list(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let competitors = scriptspy_db::list_competitors(pool).await?;

    if competitors.is_empty() {
        println!("no competitors tracked; add one with `competitors add <name> <handle>`");
        return Ok(());
    }

    println!("{:<7}{:<26}{:<18}NAME", "ID", "HANDLE", "LAST CHECKED");
    for competitor in &competitors {
        println!(
            "{:<7}{:<26}{:<18}{}",
            competitor.id,
            format!("@{}", competitor.handle),
            crate::fmt_time(competitor.last_checked_at),
            competitor.name
        );
    }

    Ok(())
}

/// # Errors
///
/// Returns an error if no competitor has this id or the delete fails.
pub(crate) async fn run_competitors_remove(pool: &sqlx::PgPool, id: i64) -> anyhow::Result<()> {
    match scriptspy_db::delete_competitor(pool, id).await {
        Ok(()) => {
            println!("removed competitor {id}");
            Ok(())
        }
        Err(DbError::NotFound) => anyhow::bail!("competitor {id} not found"),
        Err(e) => Err(e.into()),
    }
}

/// # Errors
///
/// Returns an error if the Apify key is missing or competitors cannot be
/// listed. Failures for individual competitors are reported in the summary.
pub(crate) async fn run_competitors_check(
    pool: &sqlx::PgPool,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let checker = CompetitorChecker::from_config(config)?;
    let summary =
        scriptspy_pipeline::run_competitor_job(pool, &checker, TriggerSource::Cli).await?;

    println!(
        "checked {} competitor(s), {} failed; {} new post(s), {} alert(s) sent",
        summary.competitors_checked,
        summary.competitors_failed,
        summary.new_posts,
        summary.notifications_sent
    );
    if summary.notifications_failed > 0 {
        println!("warning: {} alert(s) failed to send", summary.notifications_failed);
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if no competitor has this id or the query fails.
pub(crate) async fn run_competitors_posts(
    pool: &sqlx::PgPool,
    id: i64,
    limit: i64,
) -> anyhow::Result<()> {
    let competitor = match scriptspy_db::get_competitor(pool, id).await {
        Ok(c) => c,
        Err(DbError::NotFound) => anyhow::bail!("competitor {id} not found"),
        Err(e) => return Err(e.into()),
    };
    let posts = scriptspy_db::list_competitor_posts(pool, competitor.id, limit.clamp(1, 200)).await?;

    if posts.is_empty() {
        println!("no posts stored for @{}; run `competitors check` first", competitor.handle);
        return Ok(());
    }

    println!("Posts for @{} ({})", competitor.handle, competitor.name);
    println!();
    println!("{:<18}{:<12}{:<46}CAPTION", "POSTED", "TYPE", "URL");
    for post in &posts {
        println!(
            "{:<18}{:<12}{:<46}{}",
            crate::fmt_time(post.posted_at),
            post.post_type.as_deref().unwrap_or("\u{2014}"),
            post.post_url,
            post.caption
                .as_deref()
                .map(|c| crate::truncate_chars(c.trim(), 50))
                .unwrap_or_default()
        );
    }

    Ok(())
}
