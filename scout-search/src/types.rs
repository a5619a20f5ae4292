//! Core types for search results, result windows and fetched pages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single organic link scraped from a search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Anchor text of the result, empty when the engine exposes none.
    pub title: String,
    /// Absolute `http`/`https` destination.
    pub url: String,
    /// Zero-based position on the results page before windowing.
    pub position: usize,
}

/// Supported search engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    /// Google HTML results. Best quality, aggressive bot detection.
    #[default]
    Google,
    /// DuckDuckGo's JavaScript-free HTML endpoint.
    DuckDuckGo,
}

impl SearchEngine {
    /// Returns the human-readable name of this engine.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::DuckDuckGo => "DuckDuckGo",
        }
    }

    /// Returns all available engine variants.
    pub fn all() -> &'static [SearchEngine] {
        &[Self::Google, Self::DuckDuckGo]
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Half-open `[start, stop)` slice of a results page.
///
/// The same window is sent to the engine as offset parameters and applied
/// again to the parsed links, because engines routinely return more results
/// than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultWindow {
    /// First position kept.
    pub start: usize,
    /// First position dropped.
    pub stop: usize,
}

impl ResultWindow {
    /// Create a window. `stop` lower than `start` yields an empty window.
    pub fn new(start: usize, stop: usize) -> Self {
        Self { start, stop }
    }

    /// Number of positions covered by the window.
    pub fn len(&self) -> usize {
        self.stop.saturating_sub(self.start)
    }

    /// Returns `true` when the window covers no positions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep only the items inside the window, preserving order.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.start)
            .take(self.len())
            .collect()
    }
}

impl Default for ResultWindow {
    fn default() -> Self {
        Self { start: 3, stop: 6 }
    }
}

/// Extracted readable content from a fetched web page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// The URL that was fetched.
    pub url: String,
    /// The page title extracted from HTML.
    pub title: String,
    /// Cleaned, readable text content with HTML boilerplate stripped.
    pub text: String,
    /// Number of words in the extracted text.
    pub word_count: usize,
}

/// Result of probing a link for its title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTitle {
    /// Final URL after redirects.
    pub link: String,
    /// Contents of `<title>`, or `"Title not found"`.
    pub title: String,
}
