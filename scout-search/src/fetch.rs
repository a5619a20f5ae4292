//! Page fetching: readable content for summarisation and title probes.

use crate::config::SearchConfig;
use crate::content::{self, MISSING_TITLE};
use crate::error::{Result, SearchError};
use crate::http;
use crate::types::{PageContent, PageTitle};
use scraper::Html;

/// Fetch `url` and extract its readable text.
///
/// Redirects are followed; the returned [`PageContent::url`] is the URL that
/// was requested, not the final one.
///
/// # Errors
///
/// - [`SearchError::Timeout`] when the request exceeds `config.timeout_seconds`
/// - [`SearchError::Status`] for non-success status codes
/// - [`SearchError::Http`] for other transport failures
/// - [`SearchError::Parse`] when the page has no readable text
pub async fn fetch_page_content(url: &str, config: &SearchConfig) -> Result<PageContent> {
    let html = fetch_html(url, config).await?.1;
    content::extract_content_with_limit(&html, url, config.max_content_chars)
}

/// Fetch `url` and report its final location and `<title>`.
///
/// A page without a title yields `"Title not found"` rather than an error.
///
/// # Errors
///
/// Same transport and status errors as [`fetch_page_content`].
pub async fn fetch_page_title(url: &str, config: &SearchConfig) -> Result<PageTitle> {
    let (final_url, html) = fetch_html(url, config).await?;
    if final_url != url {
        tracing::info!(from = url, to = %final_url, "link redirected");
    }

    let document = Html::parse_document(&html);
    Ok(PageTitle {
        link: final_url,
        title: content::extract_title(&document).unwrap_or_else(|| MISSING_TITLE.to_owned()),
    })
}

async fn fetch_html(url: &str, config: &SearchConfig) -> Result<(String, String)> {
    let client = http::build_client(config)?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SearchError::from_reqwest("page request failed", &e))?
        .error_for_status()
        .map_err(|e| SearchError::from_reqwest("page request failed", &e))?;

    let final_url = response.url().to_string();
    let html = response
        .text()
        .await
        .map_err(|e| SearchError::from_reqwest("page body read failed", &e))?;

    tracing::trace!(url, bytes = html.len(), "page fetched");
    Ok((final_url, html))
}
