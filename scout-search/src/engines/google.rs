//! Google search engine — best results but aggressive bot detection.
//!
//! Google has the highest quality results but employs aggressive bot
//! detection including CAPTCHAs, cookie consent walls, and IP-based rate
//! limiting. A blocked request surfaces as a non-200 status, which this
//! engine turns into an empty link list for the query.

use crate::config::SearchConfig;
use crate::engine::{is_external_link, SearchEngineTrait};
use crate::error::SearchError;
use crate::http;
use crate::types::{ResultWindow, SearchEngine, SearchResult};
use scraper::{Html, Selector};
use url::Url;

/// Public Google results endpoint.
pub const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";

/// Google HTML search scraper.
///
/// Requests `num = window.stop` results starting at `start = window.start`,
/// then applies the same window to the parsed organic links.
pub struct GoogleEngine;

impl GoogleEngine {
    /// Build the results-page URL for `query` with both window offsets.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configured endpoint is not a
    /// valid URL.
    pub fn build_url(query: &str, config: &SearchConfig) -> Result<Url, SearchError> {
        let endpoint = config.endpoint(GOOGLE_SEARCH_URL);
        let mut url = Url::parse(endpoint)
            .map_err(|e| SearchError::Config(format!("invalid Google endpoint {endpoint}: {e}")))?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("num", &config.window.stop.to_string())
            .append_pair("start", &config.window.start.to_string());
        Ok(url)
    }
}

impl SearchEngineTrait for GoogleEngine {
    async fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let url = Self::build_url(query, config)?;
        tracing::debug!(query, "Google search");

        let client = http::build_client(config)?;
        let response = client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("Google request failed", &e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::warn!(
                query,
                status = status.as_u16(),
                "Google returned non-200 status, no links for this query"
            );
            return Ok(Vec::new());
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest("Google response read failed", &e))?;

        tracing::trace!(bytes = html.len(), "Google response received");

        parse_google_html(&html, config.window)
    }

    fn engine_type(&self) -> SearchEngine {
        SearchEngine::Google
    }
}

/// Parse a Google results page into windowed organic links.
///
/// Organic results live in `div.yuRUbf` containers whose first anchor holds
/// the destination. Relative `/url?q=` redirects and other non-web schemes
/// are dropped before the window is applied.
pub(crate) fn parse_google_html(
    html: &str,
    window: ResultWindow,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse("div.yuRUbf")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let anchor_sel = Selector::parse("a[href]")
        .map_err(|e| SearchError::Parse(format!("invalid anchor selector: {e:?}")))?;
    let title_sel = Selector::parse("h3")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;

    let mut results = Vec::new();
    for element in document.select(&result_sel) {
        let Some(anchor) = element.select(&anchor_sel).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !is_external_link(href) {
            continue;
        }

        let title = anchor
            .select(&title_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_owned())
            .unwrap_or_default();

        results.push(SearchResult {
            title,
            url: href.to_owned(),
            position: results.len(),
        });
    }

    Ok(window.slice(results))
}
