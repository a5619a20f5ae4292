//! Markdown rendering of the final two-table report.

use super::parse::Judgment;
use crate::summaries::artifact_name;

/// `venture_capital` -> `Venture capital`.
pub fn display_industry(industry: &str) -> String {
    let spaced = industry.split('_').collect::<Vec<_>>().join(" ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Render the report for `industry`.
pub fn render_report(industry: &str, selected: &[Judgment], rejected: &[Judgment]) -> String {
    let mut out = format!(
        "## Report on information source search for RND platform in the {} industry\n\n",
        display_industry(industry)
    );
    push_table(&mut out, "Selected", "selection", selected);
    out.push_str("\n\n");
    push_table(&mut out, "Rejected", "rejection", rejected);
    out
}

fn push_table(out: &mut String, heading: &str, column: &str, rows: &[Judgment]) {
    out.push_str(&format!(
        "### **{heading} sources ({}):**\n\n| **Source** | **Reasons for {column}** |\n|---|---|\n",
        rows.len()
    ));
    for row in rows {
        out.push_str(&format!(
            "| [{}]({}) | {} |\n",
            artifact_name(&row.url),
            row.url,
            escape_cell(&row.reason)
        ));
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
