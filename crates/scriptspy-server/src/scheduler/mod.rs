//! Background job scheduler.
//!
//! Owns the two recurring pipeline jobs. Each job has its own [`RunState`],
//! so a slow run never overlaps the next tick and a stopped job stays quiet.

mod run_state;

use std::sync::Arc;
use std::time::Duration;

use scriptspy_core::AppConfig;
use scriptspy_db::TriggerSource;
use scriptspy_pipeline::{run_competitor_job, run_trend_job, CompetitorChecker, TrendAggregator};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use run_state::{run_guarded, RunState};

const TRENDS_JOB: &str = "trends";
const COMPETITORS_JOB: &str = "competitors";

pub struct PipelineScheduler {
    scheduler: JobScheduler,
    trends: Arc<RunState>,
    competitors: Arc<RunState>,
}

impl PipelineScheduler {
    /// Build both pipelines from `config`, register their interval jobs, and
    /// start the scheduler.
    ///
    /// # Errors
    ///
    /// Returns an error if a pipeline cannot be constructed, a job cannot be
    /// registered, or the scheduler fails to start.
    pub async fn start(pool: PgPool, config: &AppConfig) -> anyhow::Result<Self> {
        let aggregator = Arc::new(TrendAggregator::from_config(config)?);
        let checker = Arc::new(CompetitorChecker::from_config(config)?);
        let trends = Arc::new(RunState::default());
        let competitors = Arc::new(RunState::default());

        let scheduler = JobScheduler::new().await?;
        register_trend_job(
            &scheduler,
            pool.clone(),
            aggregator,
            Arc::clone(&trends),
            minutes(config.trend_interval_mins),
        )
        .await?;
        register_competitor_job(
            &scheduler,
            pool,
            checker,
            Arc::clone(&competitors),
            minutes(config.competitor_interval_mins),
        )
        .await?;

        scheduler.start().await?;
        Ok(Self {
            scheduler,
            trends,
            competitors,
        })
    }

    /// Stop both jobs and shut the timer down. An in-flight run is not
    /// interrupted here; its transaction either commits or rolls back.
    ///
    /// # Errors
    ///
    /// Returns [`JobSchedulerError`] if the scheduler fails to shut down.
    pub async fn shutdown(mut self) -> Result<(), JobSchedulerError> {
        self.trends.stop();
        self.competitors.stop();
        self.scheduler.shutdown().await?;
        tracing::info!("scheduler: stopped");
        Ok(())
    }
}

fn minutes(mins: u64) -> Duration {
    Duration::from_secs(mins.saturating_mul(60))
}

/// Register the trend aggregation job, every `every` (default 240 minutes).
async fn register_trend_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    aggregator: Arc<TrendAggregator>,
    state: Arc<RunState>,
    every: Duration,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_repeated_async(every, move |_uuid, _lock| {
        let pool = pool.clone();
        let aggregator = Arc::clone(&aggregator);
        let state = Arc::clone(&state);

        Box::pin(async move {
            run_guarded(TRENDS_JOB, &state, async move {
                tracing::info!("scheduler: starting trend run");
                match run_trend_job(&pool, &aggregator, TriggerSource::Scheduler).await {
                    Ok(count) => tracing::info!(count, "scheduler: trend run complete"),
                    Err(e) => tracing::error!(error = %e, "scheduler: trend run failed"),
                }
            })
            .await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(every_secs = every.as_secs(), "scheduler: registered trends job");
    Ok(())
}

/// Register the competitor post check job, every `every` (default 30 minutes).
async fn register_competitor_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    checker: Arc<CompetitorChecker>,
    state: Arc<RunState>,
    every: Duration,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_repeated_async(every, move |_uuid, _lock| {
        let pool = pool.clone();
        let checker = Arc::clone(&checker);
        let state = Arc::clone(&state);

        Box::pin(async move {
            run_guarded(COMPETITORS_JOB, &state, async move {
                tracing::info!("scheduler: starting competitor run");
                match run_competitor_job(&pool, &checker, TriggerSource::Scheduler).await {
                    Ok(summary) => tracing::info!(
                        checked = summary.competitors_checked,
                        failed = summary.competitors_failed,
                        new_posts = summary.new_posts,
                        "scheduler: competitor run complete"
                    ),
                    Err(e) => tracing::error!(error = %e, "scheduler: competitor run failed"),
                }
            })
            .await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(every_secs = every.as_secs(), "scheduler: registered competitors job");
    Ok(())
}
