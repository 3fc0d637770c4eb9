use thiserror::Error;

/// Errors returned by the source adapters.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Required provider credentials are not configured.
    #[error("{provider} credentials are not configured (set {vars})")]
    MissingCredentials {
        provider: &'static str,
        vars: &'static str,
    },

    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    /// The response body did not have the expected shape.
    #[error("{provider} response could not be parsed: {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl SourceError {
    /// Returns `true` for errors that are worth retrying after a back-off delay.
    ///
    /// **Retriable:** timeouts, connection failures, HTTP 429 and 5xx.
    /// Everything else (missing credentials, 4xx, malformed bodies) fails
    /// the same way on every attempt.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            SourceError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            SourceError::Status { status, .. } => *status == 429 || *status >= 500,
            SourceError::MissingCredentials { .. }
            | SourceError::Parse { .. }
            | SourceError::Xml(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_rate_limits_are_retriable() {
        for status in [429, 500, 502, 503] {
            let err = SourceError::Status {
                provider: "newsapi",
                status,
            };
            assert!(err.is_retriable(), "status {status} should be retriable");
        }
    }

    #[test]
    fn client_errors_are_not_retriable() {
        for status in [400, 401, 403, 404] {
            let err = SourceError::Status {
                provider: "newsapi",
                status,
            };
            assert!(!err.is_retriable(), "status {status} should not be retriable");
        }
    }

    #[test]
    fn configuration_and_parse_errors_are_not_retriable() {
        assert!(!SourceError::MissingCredentials {
            provider: "apify",
            vars: "APIFY_API_KEY",
        }
        .is_retriable());
        assert!(!SourceError::Parse {
            provider: "reddit",
            message: "bad".to_string(),
        }
        .is_retriable());
    }
}
