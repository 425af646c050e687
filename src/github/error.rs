//! Error types for the GitHub REST transport.
//!
//! [`TrackerError`] is what every [`IssueTracker`](super::IssueTracker) call
//! fails with. Callers that care about a specific status (the label lookup
//! treats 404 as "absent", issue creation remaps a handful of statuses) match
//! on [`TrackerError::status`]; everything else is propagated unchanged.

use thiserror::Error;

/// Errors that can occur while talking to the issue tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The server answered with a non-success status.
    #[error("GitHub API error (status {status}): {message}")]
    Api {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    /// HTTP 429, or a 403 carrying an exhausted rate-limit header.
    #[error("rate limited (status {status}), retry after {retry_after_secs}s")]
    RateLimited {
        method: String,
        url: String,
        status: u16,
        retry_after_secs: u64,
    },

    /// Underlying network failure (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The configured base URL cannot be extended with path segments.
    #[error("invalid API url: {0}")]
    InvalidUrl(String),
}

impl TrackerError {
    /// HTTP status the server answered with, for API and rate-limit errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            TrackerError::Api { status, .. } | TrackerError::RateLimited { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// `METHOD url -> status` for diagnostics, when the error came from a response.
    pub fn request_line(&self) -> Option<String> {
        match self {
            TrackerError::Api {
                method,
                url,
                status,
                ..
            }
            | TrackerError::RateLimited {
                method,
                url,
                status,
                ..
            } => Some(format!("{method} {url} -> {status}")),
            _ => None,
        }
    }
}
