//! Prompt text for the summarisation and judgment calls.

/// Output shape the judgment call is asked to reproduce.
pub const REPORT_TEMPLATE: &str = r#"{
    "url": "https://www.example.com",
    "reliable": "Yes/No",
    "reason": "Why is this a reliable source for the current industry? 1 - 2 sentences"
}"#;

/// Prompt asking for a short, industry-tailored summary of page content.
pub fn summary_prompt(content: &str, industry: &str) -> String {
    format!(
        "As an industry-specific summarizer, create a concise summary of the provided \
         content in 2-3 sentences, tailored for R&D platform analysis. Focus on:\n\n\
         1. Whether the source is relevant for the industry \"{industry}\".\n\
         2. Briefly, why this source is valuable or why it may not meet quality criteria.\n\
         3. Industry-focused insights, case studies, and regulatory or research relevance.\n\n\
         For unsuitable sources, note the main reasons. Answer these questions:\n\n\
         1. Is this a reliable source for {industry}? (Yes/No)\n\
         2. Key strengths or limitations:\n\
         3. Primary topics covered:\n\n\
         Format the answer as Markdown.\n\n\
         \"{content}\"\n\n\
         SUMMARY:"
    )
}

/// Prompt asking for a single reliability verdict in `template`'s shape.
pub fn judgment_prompt(summary: &str, industry: &str, template: &str) -> String {
    format!(
        "Analyze the following summary and decide whether the source should be approved \
         or rejected as an information source for the industry \"{industry}\". Consider \
         industry relevance, source quality, and case-study, regulatory or research value.\n\n\
         Is this a reliable source for {industry}? Answer with exactly one JSON object \
         with the keys url, reliable and reason, one key per line, following this shape \
         and nothing else:\n\n\
         {template}\n\n\
         Summary:\n\"{summary}\""
    )
}
