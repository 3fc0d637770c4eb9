use clap::Subcommand;
use scriptspy_db::RunType;

/// Sub-commands available under `runs`.
#[derive(Debug, Subcommand)]
pub enum RunsCommands {
    /// Show recent pipeline runs, newest first
    List {
        /// Filter by run type (trends, competitors)
        #[arg(long)]
        run_type: Option<String>,
        /// Maximum number of runs to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

/// # Errors
///
/// Returns an error if `run_type` is unknown or the query fails.
pub(crate) async fn run_runs_list(
    pool: &sqlx::PgPool,
    run_type: Option<&str>,
    limit: i64,
) -> anyhow::Result<()> {
    let run_type = run_type
        .map(|raw| {
            RunType::parse(raw).ok_or_else(|| {
                anyhow::anyhow!("unknown run type '{raw}'; expected trends or competitors")
            })
        })
        .transpose()?;
    let runs = scriptspy_db::list_pipeline_runs(pool, run_type, limit.clamp(1, 200)).await?;

    if runs.is_empty() {
        println!("no pipeline runs recorded yet");
        return Ok(());
    }

    println!(
        "{:<18}{:<13}{:<11}{:<11}{:<9}ERROR",
        "STARTED", "TYPE", "TRIGGER", "STATUS", "RECORDS"
    );
    for run in &runs {
        println!(
            "{:<18}{:<13}{:<11}{:<11}{:<9}{}",
            crate::fmt_time(Some(run.started_at)),
            run.run_type,
            run.trigger_source,
            run.status,
            run.records_processed,
            run.error_message
                .as_deref()
                .map(|m| crate::truncate_chars(m, 60))
                .unwrap_or_default()
        );
    }

    Ok(())
}
