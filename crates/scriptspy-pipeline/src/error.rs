use scriptspy_db::DbError;
use scriptspy_sources::SourceError;
use thiserror::Error;

use crate::notifier::NotificationError;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A provider could not be reached, rejected the request, or is not configured.
    #[error("source {provider} unavailable: {error}")]
    SourceUnavailable {
        provider: &'static str,
        #[source]
        error: SourceError,
    },

    #[error("persistence error: {0}")]
    Persistence(#[from] DbError),

    /// Only raised while constructing the notifier; delivery failures are
    /// logged by the pipeline and never returned.
    #[error("notifier error: {0}")]
    Notifier(#[from] NotificationError),
}

impl PipelineError {
    pub(crate) fn source_unavailable(provider: &'static str, error: SourceError) -> Self {
        PipelineError::SourceUnavailable { provider, error }
    }
}
