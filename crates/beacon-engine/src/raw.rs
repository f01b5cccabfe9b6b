//! Raw rule engine output, as axe-core reports it.
//!
//! These types are read-only input to normalization. Fields the pipeline
//! does not use are ignored on deserialization; the four partitions are
//! required.

use crate::error::NormalizationError;
use beacon_core::Impact;
use serde::{Deserialize, Serialize};

/// The engine's answer for one page, split into four partitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEngineResult {
    pub violations: Vec<RawRuleOutcome>,
    pub passes: Vec<RawRuleOutcome>,
    pub incomplete: Vec<RawRuleOutcome>,
    pub inapplicable: Vec<RawRuleOutcome>,
}

impl RawEngineResult {
    /// Parse the value returned from the page.
    pub fn from_value(value: serde_json::Value) -> Result<Self, NormalizationError> {
        if !value.is_object() {
            return Err(NormalizationError(format!(
                "expected an object with four result partitions, got {}",
                json_kind(&value)
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Number of rule outcomes across all partitions.
    #[must_use]
    pub fn total(&self) -> usize {
        self.violations.len() + self.passes.len() + self.incomplete.len() + self.inapplicable.len()
    }
}

/// One rule's raw result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRuleOutcome {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub help_url: String,
    #[serde(default)]
    pub impact: Option<Impact>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<RawNode>,
}

/// A node reference inside a raw rule outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    /// Selector path; nested arrays step into shadow roots or frames
    #[serde(default)]
    pub target: Vec<serde_json::Value>,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub failure_summary: Option<String>,
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
