//! Pattern extraction of judgment fields from free-form model output.
//!
//! The model is asked for one JSON object but routinely wraps it in prose,
//! code fences, or drops the quotes around keys. Fields are therefore found
//! line by line with regular expressions instead of a JSON parser.

use regex::Regex;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""?url"?\s*:\s*"(https?://[^"]+)""#).expect("valid regex")
});
static RELIABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"?reliable"?\s*:\s*"(yes|no)""#).expect("valid regex")
});
static REASON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""?reason"?\s*:\s*"([^"]+)""#).expect("valid regex")
});

/// A reliability verdict for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgment {
    /// Judged source.
    pub url: String,
    /// `true` for "Yes".
    pub reliable: bool,
    /// Model's reason, empty when absent.
    pub reason: String,
}

/// Extract a judgment from `text`.
///
/// Returns `None` when no `url` field is found. A missing `reliable` field
/// counts as "No".
pub fn parse_judgment(text: &str) -> Option<Judgment> {
    let mut url = None;
    let mut reliable = None;
    let mut reason = None;

    for line in text.lines() {
        if let Some(caps) = URL_RE.captures(line) {
            url = Some(caps[1].to_owned());
        }
        if let Some(caps) = RELIABLE_RE.captures(line) {
            reliable = Some(caps[1].eq_ignore_ascii_case("yes"));
        }
        if let Some(caps) = REASON_RE.captures(line) {
            reason = Some(caps[1].trim().to_owned());
        }
    }

    Some(Judgment {
        url: url?,
        reliable: reliable.unwrap_or(false),
        reason: reason.unwrap_or_default(),
    })
}
