//! Batch results: one entry per input target, in input order.

use crate::error::AuditFailure;
use beacon_browser::LoadError;
use beacon_core::{AuditResult, ConformanceLevel, Timestamp};
use beacon_engine::EvaluationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of per-URL failure, as exposed to operators and artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidUrl,
    Timeout,
    NavigationFailed,
    InjectionFailed,
    ExecutionFailed,
    Cancelled,
}

impl FailureKind {
    /// Stable snake_case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::Timeout => "timeout",
            Self::NavigationFailed => "navigation_failed",
            Self::InjectionFailed => "injection_failed",
            Self::ExecutionFailed => "execution_failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why one URL has no audit result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub kind: FailureKind,
    pub url: String,
    pub message: String,
    pub timestamp: Timestamp,
}

impl FailureRecord {
    /// Create a record stamped with the current time.
    #[must_use]
    pub fn new(kind: FailureKind, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            message: message.into(),
            timestamp: Timestamp::now(),
        }
    }

    /// Record for a target that never produced a result because the batch
    /// was cancelled.
    #[must_use]
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::new(FailureKind::Cancelled, url, "batch cancelled before this URL completed")
    }

    /// Record for a non-fatal audit failure of `url`.
    ///
    /// A driver failure has no per-URL kind; it is reported as a navigation
    /// failure when it reaches here.
    #[must_use]
    pub fn from_failure(url: &str, failure: &AuditFailure) -> Self {
        let kind = match failure {
            AuditFailure::Load(LoadError::InvalidUrl { .. }) => FailureKind::InvalidUrl,
            AuditFailure::Load(LoadError::Timeout { .. }) => FailureKind::Timeout,
            AuditFailure::Load(
                LoadError::NavigationFailed { .. } | LoadError::DriverUnavailable { .. },
            ) => FailureKind::NavigationFailed,
            AuditFailure::Evaluation(EvaluationError::InjectionFailed { .. }) => {
                FailureKind::InjectionFailed
            }
            AuditFailure::Evaluation(EvaluationError::ExecutionFailed { .. }) => {
                FailureKind::ExecutionFailed
            }
            AuditFailure::Cancelled => return Self::cancelled(url),
        };
        Self::new(kind, url, failure.to_string())
    }
}

/// Outcome of one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Audited(Box<AuditResult>),
    Failed(FailureRecord),
}

/// One input target and what became of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub url: String,
    pub conformance_level: ConformanceLevel,
    pub outcome: AuditOutcome,
}

impl BatchEntry {
    /// The audit result, when the audit succeeded.
    #[must_use]
    pub fn result(&self) -> Option<&AuditResult> {
        match &self.outcome {
            AuditOutcome::Audited(result) => Some(result.as_ref()),
            AuditOutcome::Failed(_) => None,
        }
    }

    /// The failure record, when the audit failed.
    #[must_use]
    pub fn failure(&self) -> Option<&FailureRecord> {
        match &self.outcome {
            AuditOutcome::Audited(_) => None,
            AuditOutcome::Failed(record) => Some(record),
        }
    }
}

/// Results of a batch run, ordered as the input targets were.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub run_id: Uuid,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    entries: Vec<BatchEntry>,
}

impl BatchResult {
    /// Assemble a batch result from entries already in input order.
    #[must_use]
    pub fn new(
        run_id: Uuid,
        started_at: Timestamp,
        finished_at: Timestamp,
        entries: Vec<BatchEntry>,
    ) -> Self {
        Self {
            run_id,
            started_at,
            finished_at,
            entries,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for the input at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BatchEntry> {
        self.entries.get(index)
    }

    /// Successful audits in input order.
    pub fn successes(&self) -> impl Iterator<Item = &AuditResult> {
        self.entries.iter().filter_map(BatchEntry::result)
    }

    /// Failure records in input order.
    pub fn failures(&self) -> impl Iterator<Item = &FailureRecord> {
        self.entries.iter().filter_map(BatchEntry::failure)
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}
