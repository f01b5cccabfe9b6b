//! Markdown report for a single audit.

use beacon_core::{AuditResult, Impact, RuleOutcome};

/// Nodes listed per violation before the rest are summarized.
pub(crate) const MAX_NODES_SHOWN: usize = 5;

/// Longest snippet shown, in characters.
pub(crate) const MAX_SNIPPET_CHARS: usize = 200;

/// Render a human-readable Markdown report.
#[must_use]
pub fn render_markdown(result: &AuditResult) -> String {
    let mut md = String::new();

    md.push_str("# Accessibility Audit Report\n\n");
    md.push_str(&format!("**URL:** {}\n", result.url));
    md.push_str(&format!("**Date:** {}\n", result.timestamp));
    md.push_str(&format!("**Standard:** {}\n\n", result.conformance_level));

    let summary = &result.summary;
    md.push_str("## Summary\n\n");
    md.push_str(&format!("- **Violations:** {}\n", summary.violations));
    md.push_str(&format!("- **Passes:** {}\n", summary.passes));
    md.push_str(&format!("- **Incomplete:** {}\n", summary.incomplete));
    md.push_str(&format!("- **Inapplicable:** {}\n\n", summary.inapplicable));
    md.push_str(&format!("**Accessibility Score:** {}%\n\n", result.score));

    if result.violations.is_empty() {
        md.push_str("## No Violations Found\n\n");
        md.push_str(
            "This page passes all automated WCAG 2.2 checks at the requested conformance level.\n\n",
        );
    } else {
        md.push_str("## Violations by Impact\n\n");
        for (impact, group) in result.violations_by_impact() {
            md.push_str(&format!("- **{}:** {}\n", impact_title(impact), group.len()));
        }
        md.push_str(&format!(
            "\n**Elements Affected:** {}\n\n",
            result.total_nodes_affected()
        ));

        md.push_str(&format!("## Detailed Violations ({})\n\n", result.violations.len()));
        for violation in &result.violations {
            push_violation(&mut md, violation);
        }
    }

    if !result.incomplete.is_empty() {
        md.push_str(&format!("## Items Needing Review ({})\n\n", result.incomplete.len()));
        md.push_str("These items require manual review:\n\n");
        for item in &result.incomplete {
            md.push_str(&format!(
                "- **{}** `{}` ({} instances)\n",
                item.description,
                item.id,
                item.nodes.len()
            ));
        }
    }

    md
}

fn push_violation(md: &mut String, violation: &RuleOutcome) {
    let nodes = violation.nodes.len();

    md.push_str(&format!("### {}\n\n", violation.description));
    md.push_str(&format!(
        "**Rule:** `{}` | **Impact:** {} | **Instances:** {} | **WCAG:** {}\n\n",
        violation.id,
        impact_title(violation.impact).to_uppercase(),
        nodes,
        violation.tags.join(", ")
    ));
    md.push_str(&format!("**Help:** {}\n\n", violation.help));
    if !violation.help_url.is_empty() {
        md.push_str(&format!("**How to fix:** {}\n\n", violation.help_url));
    }

    if nodes > 0 {
        md.push_str(&format!("**Affected elements ({nodes}):**\n\n"));
        for (i, node) in violation.nodes.iter().take(MAX_NODES_SHOWN).enumerate() {
            md.push_str(&format!("{}. `{}`\n", i + 1, node.selector));
            md.push_str(&format!(
                "   ```html\n   {}\n   ```\n",
                truncate_snippet(&node.snippet)
            ));
        }
        if nodes > MAX_NODES_SHOWN {
            md.push_str(&format!(
                "\n*... and {} more instances*\n",
                nodes - MAX_NODES_SHOWN
            ));
        }
    }

    md.push_str("\n---\n\n");
}

/// Cut `snippet` to [`MAX_SNIPPET_CHARS`] characters, marking the cut.
pub(crate) fn truncate_snippet(snippet: &str) -> String {
    match snippet.char_indices().nth(MAX_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &snippet[..cut]),
        None => snippet.to_string(),
    }
}

/// Capitalized impact name; `Unknown` when the engine gave none.
pub(crate) fn impact_title(impact: Option<Impact>) -> &'static str {
    match impact {
        Some(Impact::Critical) => "Critical",
        Some(Impact::Serious) => "Serious",
        Some(Impact::Moderate) => "Moderate",
        Some(Impact::Minor) => "Minor",
        None => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_snippet() {
        assert_eq!(truncate_snippet("<a>"), "<a>");

        let exact = "x".repeat(MAX_SNIPPET_CHARS);
        assert_eq!(truncate_snippet(&exact), exact);

        let long = "é".repeat(MAX_SNIPPET_CHARS + 10);
        let cut = truncate_snippet(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), MAX_SNIPPET_CHARS + 3);
    }

    #[test]
    fn test_impact_title() {
        assert_eq!(impact_title(Some(Impact::Serious)), "Serious");
        assert_eq!(impact_title(None), "Unknown");
    }
}
