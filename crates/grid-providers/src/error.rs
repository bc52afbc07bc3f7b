//! Provider error types.

use thiserror::Error;

/// Errors that can occur when fetching from upstream providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Caller passed an option the loader does not recognize, or a required
    /// option is missing/malformed. Fatal to that invocation only.
    #[error("invalid parameter '{name}' for {loader}: {reason}")]
    InvalidParameter {
        loader: String,
        name: String,
        reason: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// Provider returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Failed to decode a provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Transient failures exhausted the retry budget. Triggers the
    /// last-known-good fallback upstream; never fatal to sibling datasets.
    #[error("source '{source_name}' unavailable after {attempts} attempts: {last_error}")]
    SourceUnavailable {
        source_name: String,
        attempts: u32,
        last_error: String,
    },
}

impl ProviderError {
    /// Whether a retry could plausibly succeed: transport failures, server
    /// errors, and rate limits retry; caller misuse and decode failures do
    /// not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::InvalidParameter { .. } | Self::Parse(_) | Self::SourceUnavailable { .. } => {
                false
            }
        }
    }
}

impl From<csv::Error> for ProviderError {
    fn from(e: csv::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
