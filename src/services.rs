//! Collaborator capabilities consumed by discovery, processing and
//! reporting.
//!
//! Each trait is one fallible, possibly slow remote call with no retry
//! contract. Production implementations live here ([`WebLinkSearch`],
//! [`WebPageFetch`], which also implements [`TitleProbe`]) and in
//! [`crate::llm`]; tests substitute fakes.

use crate::error::Result;
use async_trait::async_trait;
use scout_search::{PageTitle, SearchConfig};

/// Query string to result URLs.
#[async_trait]
pub trait LinkSearch: Send + Sync {
    /// Search `query` and return result URLs in page order.
    async fn search(&self, query: &str) -> Result<Vec<String>>;
}

/// URL to readable page text.
#[async_trait]
pub trait PageFetch: Send + Sync {
    /// Fetch `url` and return its readable text.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Page text to summary.
#[async_trait]
pub trait Summarize: Send + Sync {
    /// Summarise `content` for `industry`.
    async fn summarize(&self, content: &str, industry: &str) -> Result<String>;
}

/// Summary to structured reliability verdict.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Judge `summary` for `industry`, answering in `template`'s shape.
    async fn judge(&self, summary: &str, industry: &str, template: &str) -> Result<String>;
}

/// URL to final location and page title.
#[async_trait]
pub trait TitleProbe: Send + Sync {
    /// Follow redirects from `url` and read the `<title>`.
    async fn probe(&self, url: &str) -> Result<PageTitle>;
}

/// [`LinkSearch`] backed by search-result scraping.
#[derive(Debug, Clone)]
pub struct WebLinkSearch {
    config: SearchConfig,
}

impl WebLinkSearch {
    /// Search with `config` (engine, window, timeout).
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl LinkSearch for WebLinkSearch {
    async fn search(&self, query: &str) -> Result<Vec<String>> {
        Ok(scout_search::search_links(query, &self.config).await?)
    }
}

/// [`PageFetch`] backed by readable-text extraction.
#[derive(Debug, Clone)]
pub struct WebPageFetch {
    config: SearchConfig,
}

impl WebPageFetch {
    /// Fetch with `config` (timeout, content limit).
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PageFetch for WebPageFetch {
    async fn fetch(&self, url: &str) -> Result<String> {
        let page = scout_search::fetch_page_content(url, &self.config).await?;
        tracing::debug!(url, words = page.word_count, "page content extracted");
        Ok(page.text)
    }
}

#[async_trait]
impl TitleProbe for WebPageFetch {
    async fn probe(&self, url: &str) -> Result<PageTitle> {
        Ok(scout_search::fetch_page_title(url, &self.config).await?)
    }
}
