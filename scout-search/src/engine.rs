//! Trait definition for pluggable search engine backends.
//!
//! Each engine implements [`SearchEngineTrait`] so that link discovery can
//! switch between Google and DuckDuckGo without caring about URL layout,
//! HTTP method or result markup.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::{SearchEngine, SearchResult};

/// A pluggable search engine backend.
///
/// Implementors handle their own URL construction, request headers and
/// HTML parsing. They must:
///
/// - return only absolute `http`/`https` links,
/// - apply `config.window` to the parsed links before returning,
/// - report a non-success status as an empty result rather than an error.
///
/// All implementations must be `Send + Sync` so they can be shared across
/// discovery workers.
pub trait SearchEngineTrait: Send + Sync {
    /// Perform a web search and return the windowed, parsed results.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on transport failures, timeouts, or HTML that
    /// cannot be parsed at all.
    fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> impl std::future::Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;

    /// Returns which [`SearchEngine`] variant this implementation represents.
    fn engine_type(&self) -> SearchEngine;
}

/// Keep only absolute web links: `http://` or `https://`.
pub(crate) fn is_external_link(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://")
}
