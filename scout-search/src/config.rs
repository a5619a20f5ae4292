//! Search and fetch configuration with sensible defaults.
//!
//! [`SearchConfig`] controls which engine is scraped, the result window,
//! request timeouts and the User-Agent. The defaults match a small
//! `[3, 6)` window on Google with a 10 second timeout.

use crate::content::DEFAULT_MAX_CHARS;
use crate::error::SearchError;
use crate::types::{ResultWindow, SearchEngine};

/// Configuration for search and page-fetch requests.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Which engine to scrape.
    pub engine: SearchEngine,
    /// Results window requested from the engine and re-applied locally.
    pub window: ResultWindow,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Maximum characters of readable text kept per fetched page.
    pub max_content_chars: usize,
    /// Override for the engine endpoint. Used to point scrapers at a local
    /// server; `None` means the engine's public URL.
    pub endpoint_override: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine: SearchEngine::Google,
            window: ResultWindow::default(),
            timeout_seconds: 10,
            user_agent: None,
            max_content_chars: DEFAULT_MAX_CHARS,
            endpoint_override: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `window.stop` must be greater than `window.start`
    /// - `timeout_seconds` must be greater than 0
    /// - `max_content_chars` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.window.stop <= self.window.start {
            return Err(SearchError::Config(format!(
                "window stop ({}) must be greater than start ({})",
                self.window.stop, self.window.start
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_content_chars == 0 {
            return Err(SearchError::Config(
                "max_content_chars must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// The endpoint for the configured engine, honouring the override.
    pub fn endpoint<'a>(&'a self, default: &'a str) -> &'a str {
        self.endpoint_override.as_deref().unwrap_or(default)
    }
}
