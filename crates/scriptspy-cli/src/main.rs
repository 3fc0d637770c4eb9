mod competitors;
mod runs;
mod trends;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::competitors::CompetitorsCommands;
use crate::runs::RunsCommands;
use crate::trends::TrendsCommands;

#[derive(Debug, Parser)]
#[command(name = "scriptspy-cli")]
#[command(about = "ScriptSpy trend and competitor intelligence")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Collect and inspect trending topics
    Trends {
        #[command(subcommand)]
        command: TrendsCommands,
    },
    /// Manage tracked competitor accounts
    Competitors {
        #[command(subcommand)]
        command: CompetitorsCommands,
    },
    /// Inspect the pipeline run ledger
    Runs {
        #[command(subcommand)]
        command: RunsCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = scriptspy_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = scriptspy_db::PoolConfig::from_app_config(&config);
    let pool = scriptspy_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Migrate => {
            let applied = scriptspy_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Trends { command } => match command {
            TrendsCommands::Run => trends::run_trends_collect(&pool, &config).await?,
            TrendsCommands::List { source, limit } => {
                trends::run_trends_list(&pool, source.as_deref(), limit).await?;
            }
        },
        Commands::Competitors { command } => match command {
            CompetitorsCommands::Add { name, handle } => {
                competitors::run_competitors_add(&pool, &name, &handle).await?;
            }
            CompetitorsCommands::List => competitors::run_competitors_list(&pool).await?,
            CompetitorsCommands::Remove { id } => {
                competitors::run_competitors_remove(&pool, id).await?;
            }
            CompetitorsCommands::Check => {
                competitors::run_competitors_check(&pool, &config).await?;
            }
            CompetitorsCommands::Posts { id, limit } => {
                competitors::run_competitors_posts(&pool, id, limit).await?;
            }
        },
        Commands::Runs { command } => match command {
            RunsCommands::List { run_type, limit } => {
                runs::run_runs_list(&pool, run_type.as_deref(), limit).await?;
            }
        },
    }

    Ok(())
}

/// Format an optional timestamp for display, returning `"\u{2014}"` when `None`.
pub(crate) fn fmt_time(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "\u{2014}".to_string(),
        |t| t.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Cut `s` to `max` characters, marking the cut with `...`.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max).collect::<String>())
    } else {
        s.to_string()
    }
}
