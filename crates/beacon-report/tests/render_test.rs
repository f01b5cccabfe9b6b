use beacon_core::{
    AuditResult, ConformanceLevel, Impact, NodeDescriptor, RuleOutcome, Summary, Timestamp,
};
use beacon_report::{render, render_html, render_markdown, render_summary, ReportFormat};
use beacon_scanner::{AuditOutcome, BatchEntry, BatchResult, FailureKind, FailureRecord};

fn node(selector: &str, snippet: &str) -> NodeDescriptor {
    NodeDescriptor {
        selector: selector.to_string(),
        snippet: snippet.to_string(),
        failure_summary: None,
    }
}

fn violation(id: &str, impact: Impact, nodes: Vec<NodeDescriptor>) -> RuleOutcome {
    RuleOutcome {
        id: id.to_string(),
        description: format!("Ensures {id} is satisfied"),
        help: format!("Fix {id}"),
        help_url: format!("https://dequeuniversity.com/rules/axe/4.8/{id}"),
        impact: Some(impact),
        tags: vec!["wcag2a".to_string(), "wcag111".to_string()],
        nodes,
    }
}

fn result_with(violations: Vec<RuleOutcome>, incomplete: Vec<RuleOutcome>) -> AuditResult {
    AuditResult {
        url: "https://example.com/?a=1&b=2".to_string(),
        timestamp: Timestamp::from_rfc3339("2025-06-01T09:00:00Z").unwrap(),
        conformance_level: ConformanceLevel::AA.label(),
        summary: Summary {
            violations: violations.len(),
            passes: 10,
            incomplete: incomplete.len(),
            inapplicable: 3,
        },
        score: 83,
        violations,
        passes: vec![],
        incomplete,
        inapplicable: vec![],
    }
}

#[test]
fn test_markdown_report_sections() {
    let many_nodes = (0..7)
        .map(|i| node(&format!("li:nth-child({i})"), "<li>"))
        .collect();
    let result = result_with(
        vec![
            violation("image-alt", Impact::Critical, vec![node("img.hero", "<img src=\"hero.png\">")]),
            violation("list", Impact::Serious, many_nodes),
        ],
        vec![violation("color-contrast", Impact::Serious, vec![node("p", "<p>")])],
    );

    let md = render_markdown(&result);

    assert!(md.starts_with("# Accessibility Audit Report"));
    assert!(md.contains("**URL:** https://example.com/?a=1&b=2"));
    assert!(md.contains("**Standard:** WCAG 2.2 Level AA"));
    assert!(md.contains("- **Violations:** 2"));
    assert!(md.contains("**Accessibility Score:** 83%"));
    assert!(md.contains("- **Critical:** 1"));
    assert!(md.contains("- **Serious:** 1"));
    assert!(md.contains("**Elements Affected:** 8"));
    assert!(md.contains("## Detailed Violations (2)"));
    assert!(md.contains("1. `img.hero`"));
    assert!(md.contains("5. `li:nth-child(4)`"));
    assert!(!md.contains("li:nth-child(5)"));
    assert!(md.contains("*... and 2 more instances*"));
    assert!(md.contains("## Items Needing Review (1)"));
    assert!(!md.contains("No Violations Found"));
}

#[test]
fn test_markdown_no_violations_banner() {
    let md = render_markdown(&result_with(vec![], vec![]));
    assert!(md.contains("## No Violations Found"));
    assert!(!md.contains("Items Needing Review"));
}

#[test]
fn test_markdown_truncates_long_snippets() {
    let snippet = format!("<div>{}</div>", "a".repeat(400));
    let result = result_with(
        vec![violation("region", Impact::Moderate, vec![node("div", &snippet)])],
        vec![],
    );

    let md = render_markdown(&result);
    assert!(md.contains(&format!("{}...", &snippet[..200])));
    assert!(!md.contains(&snippet));
}

#[test]
fn test_html_escapes_page_content() {
    let result = result_with(
        vec![violation(
            "image-alt",
            Impact::Critical,
            vec![node("img[alt=\"x\"]", "<img src=\"x\" onerror=\"alert(1)\">")],
        )],
        vec![],
    );

    let html = render_html(&result);

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("https://example.com/?a=1&amp;b=2"));
    assert!(html.contains("&lt;img src=&quot;x&quot; onerror=&quot;alert(1)&quot;&gt;"));
    assert!(!html.contains("onerror=\"alert(1)\""));
    assert!(html.contains("img[alt=&quot;x&quot;]"));
}

#[test]
fn test_html_groups_by_impact_with_colors() {
    let result = result_with(
        vec![
            violation("region", Impact::Moderate, vec![]),
            violation("image-alt", Impact::Critical, vec![]),
            violation("label", Impact::Critical, vec![]),
        ],
        vec![],
    );

    let html = render_html(&result);

    let critical = html.find("<h3>Critical (2)</h3>").expect("critical group");
    let moderate = html.find("<h3>Moderate (1)</h3>").expect("moderate group");
    assert!(critical < moderate);
    assert!(html.contains("background-color: #d32f2f;"));
    assert!(html.contains("background-color: #fbc02d;"));
    assert!(html.contains("<div class=\"number\">83%</div>"));
}

#[test]
fn test_unrated_violations_counted_in_both_formats() {
    let unrated = RuleOutcome {
        impact: None,
        ..violation("aria-allowed-attr", Impact::Minor, vec![])
    };
    let result = result_with(
        vec![violation("region", Impact::Moderate, vec![]), unrated],
        vec![],
    );

    let md = render_markdown(&result);
    assert!(md.contains("- **Moderate:** 1\n- **Unknown:** 1\n"));

    let html = render_html(&result);
    let moderate = html.find("<h3>Moderate (1)</h3>").expect("moderate group");
    let unknown = html.find("<h3>Unknown (1)</h3>").expect("unrated group");
    assert!(moderate < unknown);
}

#[test]
fn test_html_no_violations_banner() {
    let html = render_html(&result_with(vec![], vec![]));
    assert!(html.contains("<h2>No Violations Found</h2>"));
}

#[test]
fn test_render_all_formats() {
    let result = result_with(vec![], vec![]);
    let reports = render(&result, ReportFormat::All).unwrap();

    assert_eq!(reports.len(), 3);
    let json: AuditResult = serde_json::from_str(&reports[0].contents).unwrap();
    assert_eq!(json, result);
    assert!(reports[1].contents.starts_with("# Accessibility Audit Report"));
    assert!(reports[2].contents.starts_with("<!DOCTYPE html>"));
}

#[test]
fn test_batch_summary_lines() {
    let now = Timestamp::now();
    let batch = BatchResult::new(
        uuid::Uuid::new_v4(),
        now,
        now,
        vec![
            BatchEntry {
                url: "https://example.com/?a=1&b=2".to_string(),
                conformance_level: ConformanceLevel::AA,
                outcome: AuditOutcome::Audited(Box::new(result_with(
                    vec![violation("region", Impact::Moderate, vec![])],
                    vec![],
                ))),
            },
            BatchEntry {
                url: "https://slow.example/".to_string(),
                conformance_level: ConformanceLevel::AAA,
                outcome: AuditOutcome::Failed(FailureRecord::new(
                    FailureKind::Timeout,
                    "https://slow.example/",
                    "timed out after 10s",
                )),
            },
        ],
    );

    let summary = render_summary(&batch);
    let lines: Vec<_> = summary.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "[1/2] https://example.com/?a=1&b=2 [AA]: 1 violations, score 83%"
    );
    assert_eq!(
        lines[1],
        "[2/2] https://slow.example/ [AAA]: ERROR (timeout) timed out after 10s"
    );
    assert_eq!(lines[2], "1 of 2 pages audited, 1 failed, 1 violations total");
}
