//! Conformance filter: which rule-engine tags a conformance level selects.
//!
//! WCAG 2.0, 2.1 and 2.2 each contribute one tag per level. Levels nest,
//! so the tag set of a higher level always contains every lower level's.

use crate::types::ConformanceLevel;
use std::collections::BTreeSet;

/// Level A tags for WCAG 2.0, 2.1 and 2.2.
pub const LEVEL_A_TAGS: [&str; 3] = ["wcag2a", "wcag21a", "wcag22a"];

/// Tags introduced at Level AA.
pub const LEVEL_AA_TAGS: [&str; 3] = ["wcag2aa", "wcag21aa", "wcag22aa"];

/// Tags introduced at Level AAA.
pub const LEVEL_AAA_TAGS: [&str; 3] = ["wcag2aaa", "wcag21aaa", "wcag22aaa"];

/// Tags introduced by exactly this level, excluding lower levels.
#[must_use]
pub fn level_tags(level: ConformanceLevel) -> &'static [&'static str] {
    match level {
        ConformanceLevel::A => &LEVEL_A_TAGS,
        ConformanceLevel::AA => &LEVEL_AA_TAGS,
        ConformanceLevel::AAA => &LEVEL_AAA_TAGS,
    }
}

/// Cumulative tag set for a conformance level.
#[must_use]
pub fn tags_for(level: ConformanceLevel) -> BTreeSet<&'static str> {
    ConformanceLevel::ALL
        .iter()
        .filter(|l| **l <= level)
        .flat_map(|l| level_tags(*l).iter().copied())
        .collect()
}

/// Whether any of `tags` falls inside the level's tag set.
pub fn in_scope<'a>(level: ConformanceLevel, tags: impl IntoIterator<Item = &'a str>) -> bool {
    let selected = tags_for(level);
    tags.into_iter().any(|tag| selected.contains(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_level_a_tags() {
        let tags = tags_for(ConformanceLevel::A);
        assert_eq!(tags.len(), 3);
        assert!(tags.contains("wcag2a"));
        assert!(tags.contains("wcag22a"));
        assert!(!tags.contains("wcag2aa"));
    }

    #[test]
    fn test_aa_includes_a() {
        let tags = tags_for(ConformanceLevel::AA);
        assert_eq!(tags.len(), 6);
        for tag in LEVEL_A_TAGS {
            assert!(tags.contains(tag), "AA should include {tag}");
        }
        assert!(tags.contains("wcag22aa"));
        assert!(!tags.contains("wcag22aaa"));
    }

    #[test]
    fn test_aaa_includes_everything() {
        let tags = tags_for(ConformanceLevel::AAA);
        assert_eq!(tags.len(), 9);
        for tag in LEVEL_A_TAGS.iter().chain(&LEVEL_AA_TAGS) {
            assert!(tags.contains(tag), "AAA should include {tag}");
        }
        assert!(tags.contains("wcag22aaa"));
    }

    #[test]
    fn test_strict_nesting() {
        let a = tags_for(ConformanceLevel::A);
        let aa = tags_for(ConformanceLevel::AA);
        let aaa = tags_for(ConformanceLevel::AAA);

        assert!(a.is_subset(&aa) && a != aa);
        assert!(aa.is_subset(&aaa) && aa != aaa);
    }

    #[test]
    fn test_in_scope() {
        assert!(in_scope(ConformanceLevel::AA, ["cat.color", "wcag2aa"]));
        assert!(!in_scope(ConformanceLevel::A, ["wcag2aa"]));
        assert!(!in_scope(ConformanceLevel::AAA, ["best-practice"]));
    }

    fn any_level() -> impl Strategy<Value = ConformanceLevel> {
        prop_oneof![
            Just(ConformanceLevel::A),
            Just(ConformanceLevel::AA),
            Just(ConformanceLevel::AAA),
        ]
    }

    proptest! {
        #[test]
        fn prop_lower_level_is_subset(lower in any_level(), higher in any_level()) {
            prop_assume!(lower <= higher);
            prop_assert!(tags_for(lower).is_subset(&tags_for(higher)));
        }

        #[test]
        fn prop_level_tags_are_included(level in any_level()) {
            let tags = tags_for(level);
            for tag in level_tags(level) {
                prop_assert!(tags.contains(tag));
            }
        }
    }
}
