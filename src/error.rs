//! Error types for volunteer-geo

use std::time::Duration;
use thiserror::Error;

/// Main error type for volunteer-geo operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Provider returned status {0}")]
    Status(u16),

    #[error("No data received from provider")]
    EmptyResponse,

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rate limiter is no longer running")]
    RateLimiter,

    #[error("Request queue is closed")]
    QueueClosed,

    #[error("Location error: {0}")]
    Location(#[from] crate::geo::device::LocationError),

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// Whether a failed request is worth sending again.
    ///
    /// Client errors (4xx) only count as retryable when `retry_client_errors`
    /// is set; everything else on the request path is treated as transient.
    pub fn is_retryable(&self, retry_client_errors: bool) -> bool {
        match self {
            Error::Status(code) if (400..500).contains(code) => retry_client_errors,
            Error::InvalidCoordinates(_)
            | Error::Config(_)
            | Error::RateLimiter
            | Error::QueueClosed => false,
            _ => true,
        }
    }
}

/// Result type alias for volunteer-geo operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_follow_flag() {
        assert!(Error::Status(404).is_retryable(true));
        assert!(!Error::Status(404).is_retryable(false));
    }

    #[test]
    fn test_server_errors_always_retry() {
        assert!(Error::Status(503).is_retryable(false));
        assert!(Error::EmptyResponse.is_retryable(false));
        assert!(Error::Timeout(Duration::from_secs(10)).is_retryable(false));
    }

    #[test]
    fn test_limiter_shutdown_is_terminal() {
        assert!(!Error::RateLimiter.is_retryable(true));
    }
}
