//! Shared types used across beacon.
//!
//! These model an audit from request (`AuditTarget`) to the normalized,
//! durable output (`AuditResult`) handed to report renderers.

use crate::error::BeaconError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// WCAG adherence tier requested for an audit.
///
/// Levels are cumulative: AA includes every A criterion and AAA includes
/// every AA criterion.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ConformanceLevel {
    /// Level A - minimum
    A,
    /// Level AA - standard
    #[default]
    AA,
    /// Level AAA - enhanced
    AAA,
}

impl ConformanceLevel {
    /// All levels, lowest first.
    pub const ALL: [ConformanceLevel; 3] = [Self::A, Self::AA, Self::AAA];

    /// Short code: `A`, `AA` or `AAA`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::AA => "AA",
            Self::AAA => "AAA",
        }
    }

    /// Human-readable label recorded in audit results.
    #[must_use]
    pub fn label(&self) -> String {
        format!("WCAG 2.2 Level {}", self.code())
    }
}

impl fmt::Display for ConformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for ConformanceLevel {
    type Err = BeaconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "AA" => Ok(Self::AA),
            "AAA" => Ok(Self::AAA),
            other => Err(BeaconError::Validation(format!(
                "unknown conformance level '{other}', expected A, AA or AAA"
            ))),
        }
    }
}

/// One page to audit at one conformance level.
///
/// The URL is kept verbatim; the page loader rejects anything that is not
/// an absolute `http`/`https` URL, so a batch can carry malformed input
/// and still report on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditTarget {
    /// URL as supplied by the caller
    pub url: String,
    /// Requested conformance level
    pub level: ConformanceLevel,
}

impl AuditTarget {
    /// Create a new audit target.
    #[must_use]
    pub fn new(url: impl Into<String>, level: ConformanceLevel) -> Self {
        Self {
            url: url.into(),
            level,
        }
    }

    /// Build targets for several URLs sharing one level, preserving order.
    #[must_use]
    pub fn many<I, S>(urls: I, level: ConformanceLevel) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter().map(|url| Self::new(url, level)).collect()
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
///
/// Serializes as an RFC 3339 / ISO-8601 UTC string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, BeaconError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| BeaconError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

/// Severity the rule engine assigns to a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Minor
    Minor,
    /// Moderate
    Moderate,
    /// Serious
    Serious,
    /// Critical
    Critical,
}

impl Impact {
    /// Most severe first, the order reports list them in.
    pub const DESCENDING: [Impact; 4] = [
        Self::Critical,
        Self::Serious,
        Self::Moderate,
        Self::Minor,
    ];

    /// Lowercase name as the rule engine spells it.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Serious => "serious",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One DOM node a rule outcome refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// CSS selector locating the node
    pub selector: String,
    /// Outer HTML snippet of the node
    pub snippet: String,
    /// Engine-provided explanation of what failed, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_summary: Option<String>,
}

/// One rule's normalized result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Rule identifier, e.g. `image-alt`
    pub id: String,
    /// What the rule checks
    pub description: String,
    /// Short remediation help
    pub help: String,
    /// Link to full remediation guidance
    pub help_url: String,
    /// Severity; absent for passes and inapplicable rules
    pub impact: Option<Impact>,
    /// WCAG and category tags, e.g. `wcag22aa`
    pub tags: Vec<String>,
    /// Affected nodes in engine order
    pub nodes: Vec<NodeDescriptor>,
}

/// Outcome counts for one audit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Confirmed failures
    pub violations: usize,
    /// Rules that passed
    pub passes: usize,
    /// Rules needing human review
    pub incomplete: usize,
    /// Rules not applicable to the page
    pub inapplicable: usize,
}

impl Summary {
    /// Total number of rule outcomes across all four partitions.
    #[must_use]
    pub fn total(&self) -> usize {
        self.violations + self.passes + self.incomplete + self.inapplicable
    }
}

/// Normalized, durable result of auditing one page.
///
/// Created once per successful page audit by the result normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    /// Audited URL
    pub url: String,
    /// When the audit ran (UTC)
    pub timestamp: Timestamp,
    /// Label such as `WCAG 2.2 Level AA`
    pub conformance_level: String,
    /// Counts derived from the four partitions
    pub summary: Summary,
    /// Accessibility score, 0-100
    pub score: u8,
    /// Confirmed failures
    pub violations: Vec<RuleOutcome>,
    /// Passing rules
    pub passes: Vec<RuleOutcome>,
    /// Rules needing human review
    pub incomplete: Vec<RuleOutcome>,
    /// Rules that do not apply
    pub inapplicable: Vec<RuleOutcome>,
}

impl AuditResult {
    /// Violations carrying the given impact (`None` for unrated), in engine
    /// order.
    #[must_use]
    pub fn violations_with_impact(&self, impact: Option<Impact>) -> Vec<&RuleOutcome> {
        self.violations
            .iter()
            .filter(|v| v.impact == impact)
            .collect()
    }

    /// Violations grouped by impact, most severe first and unrated last.
    /// Empty groups are omitted; the group sizes sum to the violation count.
    #[must_use]
    pub fn violations_by_impact(&self) -> Vec<(Option<Impact>, Vec<&RuleOutcome>)> {
        Impact::DESCENDING
            .iter()
            .copied()
            .map(Some)
            .chain([None])
            .map(|impact| (impact, self.violations_with_impact(impact)))
            .filter(|(_, group)| !group.is_empty())
            .collect()
    }

    /// Number of DOM nodes affected by violations.
    #[must_use]
    pub fn total_nodes_affected(&self) -> usize {
        self.violations.iter().map(|v| v.nodes.len()).sum()
    }
}
