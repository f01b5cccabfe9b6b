//! Result normalizer: raw engine output to the durable `AuditResult` schema.
//!
//! Normalization is a pure function of its inputs. Counts and the score are
//! always derived from the partitions themselves.

use beacon_core::{AuditResult, ConformanceLevel, NodeDescriptor, RuleOutcome, Summary, Timestamp};
use beacon_engine::{RawEngineResult, RawNode, RawRuleOutcome};
use serde_json::Value;
use std::collections::HashSet;

/// Separator between the steps of a selector that crosses a shadow root.
const SHADOW_SEPARATOR: &str = " >>> ";

/// Map raw engine output into an `AuditResult`.
#[must_use]
pub fn normalize(
    raw: &RawEngineResult,
    url: &str,
    timestamp: Timestamp,
    level: ConformanceLevel,
) -> AuditResult {
    let violations = normalize_partition(&raw.violations, true);
    let passes = normalize_partition(&raw.passes, false);
    let incomplete = normalize_partition(&raw.incomplete, true);
    let inapplicable = normalize_partition(&raw.inapplicable, false);

    let summary = Summary {
        violations: violations.len(),
        passes: passes.len(),
        incomplete: incomplete.len(),
        inapplicable: inapplicable.len(),
    };

    AuditResult {
        url: url.to_string(),
        timestamp,
        conformance_level: level.label(),
        score: accessibility_score(summary.passes, summary.violations),
        summary,
        violations,
        passes,
        incomplete,
        inapplicable,
    }
}

/// Share of determinate outcomes that passed, as a whole percentage.
///
/// Incomplete and inapplicable outcomes are not pass/fail determinations
/// and do not count. With nothing determinate the score is 100.
#[must_use]
pub fn accessibility_score(passes: usize, violations: usize) -> u8 {
    let passes = passes as u64;
    let determinate = passes + violations as u64;
    if determinate == 0 {
        return 100;
    }
    // round half up: floor((200p + d) / 2d)
    let score = (passes * 200 + determinate) / (determinate * 2);
    u8::try_from(score).unwrap_or(100)
}

fn normalize_partition(outcomes: &[RawRuleOutcome], keep_impact: bool) -> Vec<RuleOutcome> {
    outcomes
        .iter()
        .map(|raw| normalize_outcome(raw, keep_impact))
        .collect()
}

fn normalize_outcome(raw: &RawRuleOutcome, keep_impact: bool) -> RuleOutcome {
    RuleOutcome {
        id: raw.id.clone(),
        description: raw.description.clone(),
        help: raw.help.clone(),
        help_url: raw.help_url.clone(),
        impact: if keep_impact { raw.impact } else { None },
        tags: dedup_tags(&raw.tags),
        nodes: raw.nodes.iter().map(normalize_node).collect(),
    }
}

fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}

fn normalize_node(raw: &RawNode) -> NodeDescriptor {
    NodeDescriptor {
        selector: selector_for(&raw.target),
        snippet: raw.html.clone(),
        failure_summary: raw
            .failure_summary
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .cloned(),
    }
}

/// Flatten an engine target path into one selector string.
fn selector_for(target: &[Value]) -> String {
    target
        .iter()
        .map(|part| match part {
            Value::Array(steps) => steps
                .iter()
                .map(selector_step)
                .collect::<Vec<_>>()
                .join(SHADOW_SEPARATOR),
            other => selector_step(other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn selector_step(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::Impact;
    use proptest::prelude::*;
    use serde_json::json;

    fn rule(id: &str, impact: Option<Impact>) -> RawRuleOutcome {
        RawRuleOutcome {
            id: id.to_string(),
            description: format!("{id} description"),
            help: format!("{id} help"),
            help_url: format!("https://dequeuniversity.com/rules/axe/4.8/{id}"),
            impact,
            tags: vec!["wcag2a".to_string(), "wcag111".to_string()],
            nodes: vec![RawNode {
                target: vec![json!(format!("#{id}"))],
                html: format!("<div id=\"{id}\"></div>"),
                failure_summary: Some("Fix any of the following".to_string()),
            }],
        }
    }

    fn raw_with(violations: usize, passes: usize, incomplete: usize, inapplicable: usize) -> RawEngineResult {
        let make = |prefix: &str, n: usize, impact: Option<Impact>| {
            (0..n).map(|i| rule(&format!("{prefix}-{i}"), impact)).collect()
        };
        RawEngineResult {
            violations: make("violation", violations, Some(Impact::Serious)),
            passes: make("pass", passes, None),
            incomplete: make("incomplete", incomplete, Some(Impact::Moderate)),
            inapplicable: make("inapplicable", inapplicable, None),
        }
    }

    fn fixed_time() -> Timestamp {
        Timestamp::from_rfc3339("2025-06-01T09:00:00Z").expect("valid timestamp")
    }

    #[test]
    fn test_summary_and_score_scenario() {
        let raw = raw_with(2, 10, 0, 3);
        let result = normalize(&raw, "https://example.com", fixed_time(), ConformanceLevel::AA);

        assert_eq!(
            result.summary,
            Summary {
                violations: 2,
                passes: 10,
                incomplete: 0,
                inapplicable: 3
            }
        );
        assert_eq!(result.score, 83);
        assert_eq!(result.conformance_level, "WCAG 2.2 Level AA");
        assert_eq!(result.url, "https://example.com");
    }

    #[test]
    fn test_empty_denominator_scores_100() {
        let raw = raw_with(0, 0, 1, 5);
        let result = normalize(&raw, "https://example.com", fixed_time(), ConformanceLevel::A);
        assert_eq!(result.score, 100);
        assert_eq!(result.summary.incomplete, 1);
        assert_eq!(result.summary.inapplicable, 5);
    }

    #[test]
    fn test_score_rounding() {
        assert_eq!(accessibility_score(1, 1), 50);
        assert_eq!(accessibility_score(1, 2), 33);
        assert_eq!(accessibility_score(2, 1), 67);
        assert_eq!(accessibility_score(1, 7), 13); // 12.5 rounds up
        assert_eq!(accessibility_score(0, 4), 0);
        assert_eq!(accessibility_score(9, 0), 100);
    }

    #[test]
    fn test_order_preserved() {
        let raw = RawEngineResult {
            violations: vec![
                rule("region", Some(Impact::Moderate)),
                rule("image-alt", Some(Impact::Critical)),
                rule("color-contrast", Some(Impact::Serious)),
            ],
            ..RawEngineResult::default()
        };
        let result = normalize(&raw, "https://example.com", fixed_time(), ConformanceLevel::AA);
        let ids: Vec<_> = result.violations.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["region", "image-alt", "color-contrast"]);
    }

    #[test]
    fn test_impact_dropped_for_passes_and_inapplicable() {
        let raw = RawEngineResult {
            passes: vec![rule("document-title", Some(Impact::Serious))],
            inapplicable: vec![rule("video-caption", Some(Impact::Critical))],
            incomplete: vec![rule("color-contrast", Some(Impact::Serious))],
            ..RawEngineResult::default()
        };
        let result = normalize(&raw, "https://example.com", fixed_time(), ConformanceLevel::AA);
        assert_eq!(result.passes[0].impact, None);
        assert_eq!(result.inapplicable[0].impact, None);
        assert_eq!(result.incomplete[0].impact, Some(Impact::Serious));
    }

    #[test]
    fn test_node_selectors() {
        assert_eq!(selector_for(&[json!("#main"), json!("img.logo")]), "#main img.logo");
        assert_eq!(
            selector_for(&[json!(["my-widget", "button.close"])]),
            "my-widget >>> button.close"
        );
        assert_eq!(selector_for(&[]), "");
    }

    #[test]
    fn test_blank_failure_summary_dropped() {
        let node = RawNode {
            target: vec![json!("a")],
            html: "<a></a>".to_string(),
            failure_summary: Some("   ".to_string()),
        };
        assert_eq!(normalize_node(&node).failure_summary, None);
    }

    #[test]
    fn test_tags_deduplicated_in_order() {
        let tags: Vec<String> = ["wcag2a", "cat.forms", "wcag2a", "wcag412"]
            .iter()
            .map(|t| (*t).to_string())
            .collect();
        assert_eq!(dedup_tags(&tags), vec!["wcag2a", "cat.forms", "wcag412"]);
    }

    proptest! {
        #[test]
        fn prop_counts_are_derived(v in 0usize..20, p in 0usize..20, i in 0usize..20, n in 0usize..20) {
            let raw = raw_with(v, p, i, n);
            let result = normalize(&raw, "https://example.com", fixed_time(), ConformanceLevel::AA);
            prop_assert_eq!(result.summary.violations, raw.violations.len());
            prop_assert_eq!(result.summary.passes, raw.passes.len());
            prop_assert_eq!(result.summary.incomplete, raw.incomplete.len());
            prop_assert_eq!(result.summary.inapplicable, raw.inapplicable.len());
            prop_assert_eq!(result.summary.total(), raw.total());
        }

        #[test]
        fn prop_score_bounds(passes in 0usize..10_000, violations in 0usize..10_000) {
            let score = accessibility_score(passes, violations);
            prop_assert!(score <= 100);
            if violations == 0 {
                prop_assert_eq!(score, 100);
            }
        }

        #[test]
        fn prop_normalize_is_idempotent(v in 0usize..8, p in 0usize..8, i in 0usize..8, n in 0usize..8) {
            let raw = raw_with(v, p, i, n);
            let first = normalize(&raw, "https://example.com", fixed_time(), ConformanceLevel::AAA);
            let second = normalize(&raw, "https://example.com", fixed_time(), ConformanceLevel::AAA);
            prop_assert_eq!(first, second);
        }
    }
}
