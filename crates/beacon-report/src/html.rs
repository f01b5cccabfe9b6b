//! Self-contained HTML report for a single audit.

use crate::markdown::{impact_title, truncate_snippet, MAX_NODES_SHOWN};
use beacon_core::{AuditResult, Impact, RuleOutcome};

const STYLE: &str = r"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 1200px; margin: 0 auto; padding: 20px; background: #f5f5f5; }
.header, .summary-card, .violation, .no-violations, .review { background: white; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
.header { padding: 30px; margin-bottom: 20px; }
h1 { color: #1a73e8; margin-bottom: 10px; }
h2, h3 { margin: 20px 0 10px; }
.meta { color: #666; font-size: 14px; }
.summary { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 15px; margin-bottom: 20px; }
.summary-card { padding: 20px; }
.summary-card h3 { font-size: 14px; color: #666; margin: 0 0 5px; }
.summary-card .number { font-size: 32px; font-weight: bold; }
.violations-count { color: #d32f2f; }
.passes-count { color: #388e3c; }
.score { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; border-radius: 8px; text-align: center; margin-bottom: 20px; }
.score .number { font-size: 48px; font-weight: bold; }
.violation { padding: 20px; margin-bottom: 15px; border-left: 4px solid #999; }
.violation-header { display: flex; justify-content: space-between; align-items: start; margin-bottom: 10px; }
.violation-header h4 { flex: 1; margin-right: 10px; }
.impact-badge { padding: 4px 12px; border-radius: 4px; color: white; font-size: 12px; font-weight: bold; text-transform: uppercase; }
.violation-meta { color: #666; font-size: 14px; margin-bottom: 15px; }
.violation-meta span { margin-right: 20px; }
details { margin-top: 15px; }
summary { cursor: pointer; color: #1a73e8; font-weight: 500; padding: 5px 0; }
.node { background: #f5f5f5; padding: 10px; margin: 10px 0; border-radius: 4px; }
.target { display: block; color: #d32f2f; font-weight: bold; margin-bottom: 5px; }
pre { background: #263238; color: #aed581; padding: 10px; border-radius: 4px; overflow-x: auto; font-size: 12px; }
.no-violations { padding: 40px; text-align: center; }
.no-violations h2 { color: #388e3c; font-size: 32px; }
.review { padding: 20px; }
";

/// Badge and border colour for an impact.
#[must_use]
pub fn impact_color(impact: Option<Impact>) -> &'static str {
    match impact {
        Some(Impact::Critical) => "#d32f2f",
        Some(Impact::Serious) => "#f57c00",
        Some(Impact::Moderate) => "#fbc02d",
        Some(Impact::Minor) => "#7cb342",
        None => "#999",
    }
}

/// Render a self-contained HTML report.
///
/// Everything taken from the page or the engine is escaped.
#[must_use]
pub fn render_html(result: &AuditResult) -> String {
    let summary = &result.summary;
    let url = escape(&result.url);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!("<title>Accessibility Audit Report - {url}</title>\n"));
    html.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));

    html.push_str("<div class=\"header\">\n<h1>Accessibility Audit Report</h1>\n<div class=\"meta\">\n");
    html.push_str(&format!("<p><strong>URL:</strong> {url}</p>\n"));
    html.push_str(&format!("<p><strong>Date:</strong> {}</p>\n", result.timestamp));
    html.push_str(&format!(
        "<p><strong>Standard:</strong> {}</p>\n</div>\n</div>\n",
        escape(&result.conformance_level)
    ));

    html.push_str("<div class=\"summary\">\n");
    push_card(&mut html, "Violations", summary.violations, Some("violations-count"));
    push_card(&mut html, "Passes", summary.passes, Some("passes-count"));
    push_card(&mut html, "Incomplete", summary.incomplete, None);
    push_card(&mut html, "Inapplicable", summary.inapplicable, None);
    html.push_str("</div>\n");

    html.push_str(&format!(
        "<div class=\"score\">\n<div class=\"number\">{}%</div>\n<p>Accessibility Score</p>\n</div>\n",
        result.score
    ));

    if result.violations.is_empty() {
        html.push_str(
            "<div class=\"no-violations\">\n<h2>No Violations Found</h2>\n\
             <p>This page passes all automated WCAG 2.2 checks at the requested conformance level.</p>\n</div>\n",
        );
    } else {
        html.push_str("<h2>Violations</h2>\n");
        for (impact, group) in result.violations_by_impact() {
            html.push_str(&format!("<h3>{} ({})</h3>\n", impact_title(impact), group.len()));
            for violation in group {
                push_violation(&mut html, violation);
            }
        }
    }

    if !result.incomplete.is_empty() {
        html.push_str(&format!(
            "<h2>Items Needing Review ({})</h2>\n<div class=\"review\">\n<ul>\n",
            result.incomplete.len()
        ));
        for item in &result.incomplete {
            html.push_str(&format!(
                "<li><strong>{}</strong> <code>{}</code> ({} instances)</li>\n",
                escape(&item.description),
                escape(&item.id),
                item.nodes.len()
            ));
        }
        html.push_str("</ul>\n</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn push_card(html: &mut String, title: &str, count: usize, class: Option<&str>) {
    let class = class.map_or_else(|| "number".to_string(), |c| format!("number {c}"));
    html.push_str(&format!(
        "<div class=\"summary-card\">\n<h3>{title}</h3>\n<div class=\"{class}\">{count}</div>\n</div>\n"
    ));
}

fn push_violation(html: &mut String, violation: &RuleOutcome) {
    let color = impact_color(violation.impact);
    let impact = violation.impact.map_or("unknown", |i| i.as_str());
    let nodes = violation.nodes.len();

    html.push_str(&format!(
        "<div class=\"violation\" data-impact=\"{impact}\" style=\"border-left-color: {color};\">\n"
    ));
    html.push_str(&format!(
        "<div class=\"violation-header\">\n<h4>{}</h4>\n\
         <span class=\"impact-badge\" style=\"background-color: {color};\">{impact}</span>\n</div>\n",
        escape(&violation.description)
    ));
    html.push_str(&format!(
        "<div class=\"violation-meta\">\n<span>Rule: {}</span>\n<span>Instances: {nodes}</span>\n<span>WCAG: {}</span>\n</div>\n",
        escape(&violation.id),
        escape(&violation.tags.join(", "))
    ));
    html.push_str(&format!("<p><strong>Help:</strong> {}</p>\n", escape(&violation.help)));
    if !violation.help_url.is_empty() {
        html.push_str(&format!(
            "<p><strong>Learn more:</strong> <a href=\"{}\" target=\"_blank\" rel=\"noopener\">Fix this issue</a></p>\n",
            escape(&violation.help_url)
        ));
    }

    if nodes > 0 {
        html.push_str(&format!(
            "<details><summary>Show affected elements ({nodes})</summary>\n<div class=\"nodes\">\n"
        ));
        for node in violation.nodes.iter().take(MAX_NODES_SHOWN) {
            html.push_str(&format!(
                "<div class=\"node\">\n<code class=\"target\">{}</code>\n<pre><code>{}</code></pre>\n</div>\n",
                escape(&node.selector),
                escape(&truncate_snippet(&node.snippet))
            ));
        }
        if nodes > MAX_NODES_SHOWN {
            html.push_str(&format!(
                "<p><em>... and {} more instances</em></p>\n",
                nodes - MAX_NODES_SHOWN
            ));
        }
        html.push_str("</div>\n</details>\n");
    }

    html.push_str("</div>\n");
}

/// Escape text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<img alt="a & b" src='x'>"#),
            "&lt;img alt=&quot;a &amp; b&quot; src=&#39;x&#39;&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_impact_colors() {
        assert_eq!(impact_color(Some(Impact::Critical)), "#d32f2f");
        assert_eq!(impact_color(Some(Impact::Serious)), "#f57c00");
        assert_eq!(impact_color(Some(Impact::Moderate)), "#fbc02d");
        assert_eq!(impact_color(Some(Impact::Minor)), "#7cb342");
    }
}
