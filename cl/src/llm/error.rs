//! LLM error types
//!
//! Classifies transport and HTTP failures so the retry loop in
//! [`retry`](super::retry) can decide what is worth another attempt.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use thiserror::Error;
use tracing::debug;

/// Wait assumed when a 429 carries no usable `retry-after`
const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(30);

/// Errors from one completion request
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Map a non-success HTTP reply onto the taxonomy
    ///
    /// 429 becomes `RateLimited` using the `retry-after` seconds when present.
    pub fn from_status(status: u16, headers: &HeaderMap, body: String) -> Self {
        debug!(%status, "LlmError::from_status: called");
        if status == 429 {
            let retry_after = headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_RATE_LIMIT_WAIT);
            return LlmError::RateLimited { retry_after };
        }
        LlmError::ApiError { status, message: body }
    }

    /// Map a failed send, folding client-side timeouts into `Timeout`
    pub fn from_send(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(timeout)
        } else {
            LlmError::Network(err)
        }
    }

    /// Transient failures: rate limits, request timeouts, 5xx (incl. 529 overloaded), network
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::ApiError { status, .. } => *status == 408 || (500..=599).contains(status),
            LlmError::Network(_) | LlmError::Timeout(_) => true,
            LlmError::InvalidResponse(_) | LlmError::Json(_) => false,
        }
    }

    /// Provider-requested wait, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_from_status_rate_limit_reads_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));

        let err = LlmError::from_status(429, &headers, String::new());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_from_status_rate_limit_default_wait() {
        let err = LlmError::from_status(429, &HeaderMap::new(), String::new());
        assert_eq!(err.retry_after(), Some(DEFAULT_RATE_LIMIT_WAIT));
    }

    #[test]
    fn test_from_status_api_error_keeps_body() {
        let err = LlmError::from_status(400, &HeaderMap::new(), "bad model".to_string());
        assert!(matches!(err, LlmError::ApiError { status: 400, ref message } if message == "bad model"));
        assert!(err.retry_after().is_none());
    }

    #[test]
    fn test_is_retryable() {
        for status in [408, 500, 502, 503, 504, 529] {
            let err = LlmError::from_status(status, &HeaderMap::new(), String::new());
            assert!(err.is_retryable(), "{} should be retried", status);
        }
        for status in [400, 401, 403, 404, 422] {
            let err = LlmError::from_status(status, &HeaderMap::new(), String::new());
            assert!(!err.is_retryable(), "{} should not be retried", status);
        }

        assert!(LlmError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(!LlmError::InvalidResponse("Bad JSON".to_string()).is_retryable());
    }
}
