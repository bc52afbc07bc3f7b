//! Shared HTTP response helpers for provider clients.
//!
//! Centralizes status-code checks (429 rate limiting with `Retry-After`
//! parsing, non-success status mapping) so individual provider modules stay
//! focused on request construction and response mapping.

use crate::error::ProviderError;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **429 Too Many Requests** with `Retry-After` header parsing (falls back
///   to 60 s if absent or unparseable).
/// - **Non-success status** with status code and response body.
///
/// # Errors
///
/// Returns [`ProviderError::RateLimited`] or [`ProviderError::Api`].
pub async fn check_response(
    resp: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    if resp.status() == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(ProviderError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !resp.status().is_success() {
        return Err(ProviderError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Extract a source-version marker from response headers: `ETag` when
/// present, otherwise `Last-Modified`.
#[must_use]
pub fn version_marker(resp: &reqwest::Response) -> Option<String> {
    let header = |name: reqwest::header::HeaderName| {
        resp.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim_matches('"').to_string())
    };
    header(reqwest::header::ETAG).or_else(|| header(reqwest::header::LAST_MODIFIED))
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}
