//! ScriptSpy pipelines: trend aggregation, competitor post checks, and
//! Telegram alerts.

pub mod alert;
pub mod competitors;
pub mod error;
pub mod jobs;
pub mod notifier;
pub mod trends;

pub use competitors::{CompetitorCheckSummary, CompetitorChecker};
pub use error::PipelineError;
pub use jobs::{run_competitor_job, run_trend_job};
pub use notifier::{NotificationError, TelegramNotifier};
pub use trends::TrendAggregator;
