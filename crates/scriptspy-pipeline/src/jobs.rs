//! Pipeline runs recorded in the `pipeline_runs` ledger.
//!
//! Used by both the scheduler and the CLI. The ledger row is written outside
//! the pipeline's own transaction, so a failed run is still recorded.

use scriptspy_db::{RunType, TriggerSource};
use sqlx::PgPool;

use crate::competitors::{CompetitorCheckSummary, CompetitorChecker};
use crate::error::PipelineError;
use crate::trends::TrendAggregator;

/// Run the trend pipeline once and record the outcome.
///
/// Returns the number of trends stored.
///
/// # Errors
///
/// Returns [`PipelineError::Persistence`] if the ledger row cannot be opened,
/// otherwise whatever error the pipeline itself returned.
pub async fn run_trend_job(
    pool: &PgPool,
    aggregator: &TrendAggregator,
    trigger: TriggerSource,
) -> Result<usize, PipelineError> {
    let run = scriptspy_db::start_pipeline_run(pool, RunType::Trends, trigger).await?;
    tracing::info!(run_id = run.id, trigger = trigger.as_str(), "trend run started");

    let outcome = aggregator
        .aggregate_and_store(pool)
        .await
        .map(|rows| rows.len());
    finish_run(pool, run.id, RunType::Trends, outcome.as_ref().copied()).await;
    outcome
}

/// Run the competitor pipeline once and record the outcome.
///
/// # Errors
///
/// Returns [`PipelineError::Persistence`] if the ledger row cannot be opened,
/// otherwise whatever error the pipeline itself returned.
pub async fn run_competitor_job(
    pool: &PgPool,
    checker: &CompetitorChecker,
    trigger: TriggerSource,
) -> Result<CompetitorCheckSummary, PipelineError> {
    let run = scriptspy_db::start_pipeline_run(pool, RunType::Competitors, trigger).await?;
    tracing::info!(run_id = run.id, trigger = trigger.as_str(), "competitor run started");

    let outcome = checker.check_all(pool).await;
    finish_run(
        pool,
        run.id,
        RunType::Competitors,
        outcome.as_ref().map(|summary| summary.new_posts),
    )
    .await;
    outcome
}

/// Close the ledger row. Ledger failures are logged and never mask the
/// pipeline's own result.
async fn finish_run(
    pool: &PgPool,
    run_id: i64,
    run_type: RunType,
    outcome: Result<usize, &PipelineError>,
) {
    let recorded = match outcome {
        Ok(records) => {
            let records = i32::try_from(records).unwrap_or(i32::MAX);
            tracing::info!(run_id, run_type = %run_type, records, "pipeline run succeeded");
            scriptspy_db::complete_pipeline_run(pool, run_id, records).await
        }
        Err(e) => {
            tracing::error!(run_id, run_type = %run_type, error = %e, "pipeline run failed");
            scriptspy_db::fail_pipeline_run(pool, run_id, &e.to_string()).await
        }
    };

    if let Err(e) = recorded {
        tracing::warn!(run_id, error = %e, "failed to record pipeline run outcome");
    }
}
