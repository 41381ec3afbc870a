//! Notification error types.

use thiserror::Error;

/// Errors from sending notifications.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The service returned 429 Too Many Requests.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// `notification.base_url` or `notification.api_key` is unset.
    #[error("notification service is not configured")]
    NotConfigured,
}
