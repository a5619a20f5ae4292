//! Error types for the industry-scout pipeline.

/// Top-level error type for discovery, processing and reporting.
///
/// Variants fall into three classes:
///
/// - **configuration** (`Config`, `ProjectRoot`, `QueryFile`): fatal at
///   startup, see [`ScoutError::is_fatal`];
/// - **per-item** (`Search`, `Llm`, `Io` during a link or summary): logged,
///   the item is marked failed, the run continues;
/// - **persisted state** (`Store`, `Report`): reported to the caller of the
///   store, never used to delete what is on disk.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// No ancestor directory carries the project-root marker.
    #[error("project root not found: {0}")]
    ProjectRoot(String),

    /// Query file missing or malformed.
    #[error("query file error: {0}")]
    QueryFile(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Search scraping or page fetch error.
    #[error("search error: {0}")]
    Search(#[from] scout_search::SearchError),

    /// Language model request or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Dedup store or summary store persistence error.
    #[error("store error: {0}")]
    Store(String),

    /// Report aggregation error.
    #[error("report error: {0}")]
    Report(String),
}

impl ScoutError {
    /// Returns `true` for configuration-class errors that must stop the run
    /// before any work starts.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::ProjectRoot(_) | Self::QueryFile(_)
        )
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ScoutError>;
