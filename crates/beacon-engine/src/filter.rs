//! Post-evaluation conformance filtering.
//!
//! Used when an engine cannot restrict its rule set by tag up front.

use crate::raw::{RawEngineResult, RawRuleOutcome};
use beacon_core::{in_scope, ConformanceLevel};

/// Keep only outcomes tagged for `level`, preserving order.
#[must_use]
pub fn restrict_to_level(raw: &RawEngineResult, level: ConformanceLevel) -> RawEngineResult {
    let keep = |outcomes: &[RawRuleOutcome]| -> Vec<RawRuleOutcome> {
        outcomes
            .iter()
            .filter(|o| in_scope(level, o.tags.iter().map(String::as_str)))
            .cloned()
            .collect()
    };

    RawEngineResult {
        violations: keep(&raw.violations),
        passes: keep(&raw.passes),
        incomplete: keep(&raw.incomplete),
        inapplicable: keep(&raw.inapplicable),
    }
}
