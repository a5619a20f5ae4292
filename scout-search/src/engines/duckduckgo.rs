//! DuckDuckGo search engine — the scraper-friendly fallback.
//!
//! Uses the HTML-only endpoint, which needs no JavaScript and tolerates
//! automated requests far better than Google. The endpoint has no usable
//! `num`/`start` pair, so the window is applied to the parsed page only.

use crate::config::SearchConfig;
use crate::engine::{is_external_link, SearchEngineTrait};
use crate::error::SearchError;
use crate::http;
use crate::types::{ResultWindow, SearchEngine, SearchResult};
use scraper::{Html, Selector};
use url::Url;

/// Public DuckDuckGo HTML endpoint.
pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo HTML search engine scraper.
pub struct DuckDuckGoEngine;

impl DuckDuckGoEngine {
    /// Unwrap DuckDuckGo's redirect wrapper.
    ///
    /// Links look like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`;
    /// the destination is the URL-decoded `uddg` parameter. Direct links are
    /// returned unchanged.
    fn unwrap_redirect(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_owned()
        };

        let parsed = Url::parse(&full_href).ok()?;
        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

impl SearchEngineTrait for DuckDuckGoEngine {
    async fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::debug!(query, "DuckDuckGo search");

        let client = http::build_client(config)?;
        let response = client
            .post(config.endpoint(DUCKDUCKGO_HTML_URL))
            .form(&[("q", query)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("DuckDuckGo request failed", &e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::warn!(
                query,
                status = status.as_u16(),
                "DuckDuckGo returned non-200 status, no links for this query"
            );
            return Ok(Vec::new());
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest("DuckDuckGo response read failed", &e))?;

        parse_duckduckgo_html(&html, config.window)
    }

    fn engine_type(&self) -> SearchEngine {
        SearchEngine::DuckDuckGo
    }
}

/// Parse a DuckDuckGo HTML results page into windowed organic links.
///
/// Ads (`.result--ad`) are excluded by the container selector.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    window: ResultWindow,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;

    let mut results = Vec::new();
    for element in document.select(&result_sel) {
        let Some(anchor) = element.select(&title_sel).next() else {
            continue;
        };
        let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(DuckDuckGoEngine::unwrap_redirect)
        else {
            continue;
        };
        if !is_external_link(&url) {
            continue;
        }

        results.push(SearchResult {
            title: anchor.text().collect::<String>().trim().to_owned(),
            url,
            position: results.len(),
        });
    }

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(window.slice(results))
}
