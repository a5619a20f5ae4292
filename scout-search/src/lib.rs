//! # scout-search
//!
//! Search-result link scraping and readable page extraction for
//! industry-scout.
//!
//! This crate knows how to turn a query into a bounded list of external
//! result links, and a link into clean text. It has no notion of industries,
//! language models or persistence.
//!
//! ## Design
//!
//! - Scrapes Google or DuckDuckGo HTML with CSS selectors
//! - Every engine honours a `[start, stop)` [`ResultWindow`], applied both in
//!   the request and again to the parsed links
//! - A blocked or rate-limited query yields zero links instead of an error
//! - Page text is extracted by walking the DOM and skipping boilerplate
//!   subtrees (scripts, navigation, footers, ...)
//! - No retries: callers own their retry policy

pub mod config;
pub mod content;
pub mod engine;
pub mod engines;
pub mod error;
pub mod fetch;
pub mod http;
pub mod types;

pub use config::SearchConfig;
pub use engine::SearchEngineTrait;
pub use error::{Result, SearchError};
pub use fetch::{fetch_page_content, fetch_page_title};
pub use types::{PageContent, PageTitle, ResultWindow, SearchEngine, SearchResult};

use engines::{DuckDuckGoEngine, GoogleEngine};

/// Search with the configured engine and return windowed results.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid configuration, or the
/// engine's transport/parse error. A non-200 results page is **not** an
/// error: it yields an empty list.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> scout_search::Result<()> {
/// let config = scout_search::SearchConfig::default();
/// for result in scout_search::search("smart manufacturing", &config).await? {
///     println!("{}: {}", result.position, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(query: &str, config: &SearchConfig) -> Result<Vec<SearchResult>> {
    config.validate()?;
    match config.engine {
        SearchEngine::Google => GoogleEngine.search(query, config).await,
        SearchEngine::DuckDuckGo => DuckDuckGoEngine.search(query, config).await,
    }
}

/// Search and keep only the result URLs, in page order.
///
/// # Errors
///
/// Same as [`search`].
pub async fn search_links(query: &str, config: &SearchConfig) -> Result<Vec<String>> {
    let results = search(query, config).await?;
    Ok(results.into_iter().map(|r| r.url).collect())
}
