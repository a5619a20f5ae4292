//! Error types for the scout-search crate.
//!
//! Messages are stable, lowercase and safe to log. Callers decide whether a
//! failure is fatal; nothing in this crate retries.

/// Errors that can occur while searching or fetching pages.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Transport-level failure (DNS, connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The remote answered with a non-success status code.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The request exceeded its configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The response could not be parsed into the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Map a [`reqwest::Error`] onto the closest variant, prefixing `context`.
    pub fn from_reqwest(context: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout(format!("{context}: {err}"));
        }
        if let Some(status) = err.status() {
            return Self::Status(status.as_u16());
        }
        Self::Http(format!("{context}: {err}"))
    }
}

/// Convenience type alias for scout-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
