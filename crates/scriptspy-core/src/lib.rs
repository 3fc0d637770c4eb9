pub mod app_config;
pub mod competitors;
pub mod config;
pub mod trends;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use trends::{dedupe_by_topic, normalize_topic, NewTrend, TrendSource};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid trend source: {0}")]
    InvalidTrendSource(String),

    #[error("competitor handle must not be empty")]
    EmptyHandle,
}
