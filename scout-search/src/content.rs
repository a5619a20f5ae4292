//! HTML content extraction — strips boilerplate and returns readable text.
//!
//! Walks the parsed DOM from the most specific content root available
//! (`<article>`, `<main>`, `[role=main]`, then `<body>`), skipping whole
//! subtrees of non-content elements, and returns whitespace-normalised text
//! suitable for a summarisation prompt.

use crate::error::{Result, SearchError};
use crate::types::PageContent;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Default maximum characters to return from extracted content.
pub const DEFAULT_MAX_CHARS: usize = 100_000;

/// Placeholder used when a page has no `<title>`.
pub const MISSING_TITLE: &str = "Title not found";

/// Elements whose entire subtree is dropped.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe",
    "template", "form",
];

/// Elements that start a new line in the extracted text.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "section", "article", "main", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5",
    "h6", "br", "tr", "table", "blockquote", "pre",
];

/// Content roots tried in priority order.
const CONTENT_ROOTS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

/// Extract readable text content from raw HTML.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn extract_content(html: &str, url: &str) -> Result<PageContent> {
    extract_content_with_limit(html, url, DEFAULT_MAX_CHARS)
}

/// Extract readable text content from raw HTML with a custom character limit.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn extract_content_with_limit(html: &str, url: &str, max_chars: usize) -> Result<PageContent> {
    let document = Html::parse_document(html);

    let text = CONTENT_ROOTS
        .iter()
        .filter_map(|root| Selector::parse(root).ok())
        .filter_map(|selector| document.select(&selector).next().map(readable_text))
        .find(|text| !text.is_empty())
        .ok_or_else(|| SearchError::Parse("no extractable content found".into()))?;

    let text = truncate_to_limit(&text, max_chars);
    let word_count = text.split_whitespace().count();

    Ok(PageContent {
        url: url.to_owned(),
        title: extract_title(&document).unwrap_or_default(),
        text,
        word_count,
    })
}

/// Extract the trimmed `<title>` text, if present and non-empty.
pub fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_owned();
    (!title.is_empty()).then_some(title)
}

/// Normalised text of one element, with boilerplate subtrees removed.
fn readable_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    normalise_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_text(child_el, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Collapse runs of spaces, trim every line and keep at most one blank line
/// between paragraphs.
fn normalise_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0usize;

    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            blank_run += 1;
            if blank_run == 1 && !lines.is_empty() {
                lines.push(String::new());
            }
            continue;
        }
        blank_run = 0;
        lines.push(collapsed);
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines.join("\n")
}

/// Truncate text to the given byte limit, breaking at a char boundary.
fn truncate_to_limit(text: &str, max_chars: usize) -> String {
    if text.len() <= max_chars {
        return text.to_owned();
    }

    let mut end = max_chars;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }

    let mut truncated = text[..end].to_owned();
    truncated.push_str("\n\n[Content truncated]");
    truncated
}
