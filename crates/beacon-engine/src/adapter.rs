//! The rule engine boundary and its axe-core implementation.

use crate::error::{EvaluationError, Result};
use crate::raw::RawEngineResult;
use beacon_browser::PageContext;
use beacon_core::{tags_for, ConformanceLevel, EngineConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// How often the page is re-checked while the engine script loads.
const INJECTION_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Element id given to the injected `<script>` tag.
const SCRIPT_ELEMENT_ID: &str = "beacon-axe-core";

/// Something that evaluates a loaded page against accessibility rules.
///
/// Implementations do not retry; retry policy belongs to the caller.
#[async_trait::async_trait]
pub trait RuleEngine: Send + Sync {
    /// Evaluate the page at the given conformance level.
    async fn evaluate(
        &self,
        context: &mut PageContext,
        level: ConformanceLevel,
    ) -> Result<RawEngineResult>;

    /// Whether `evaluate` already restricts rules to the level's tags.
    /// When false the caller filters the raw result afterwards.
    fn applies_tag_filter(&self) -> bool {
        true
    }

    /// Engine name for logs.
    fn name(&self) -> &str;
}

/// Where the axe-core script comes from.
#[derive(Debug, Clone)]
pub enum AxeSource {
    /// Loaded by the page from a URL via a `<script src>` tag
    Url(String),
    /// Script text evaluated directly in the page
    Inline(Arc<str>),
}

/// Options object handed to `axe.run`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    run_only: RunOnly,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    rules: BTreeMap<String, RuleToggle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct RunOnly {
    #[serde(rename = "type")]
    kind: &'static str,
    values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct RuleToggle {
    enabled: bool,
}

impl RunOptions {
    /// Options selecting the level's tags and switching off `disabled_rules`.
    #[must_use]
    pub fn new(level: ConformanceLevel, disabled_rules: &[String]) -> Self {
        Self {
            run_only: RunOnly {
                kind: "tag",
                values: tags_for(level).into_iter().map(str::to_string).collect(),
            },
            rules: disabled_rules
                .iter()
                .map(|id| (id.clone(), RuleToggle { enabled: false }))
                .collect(),
        }
    }

    /// Tags the run is restricted to.
    #[must_use]
    pub fn tag_values(&self) -> &[String] {
        &self.run_only.values
    }

    /// Serialize as a JavaScript object literal.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// axe-core adapter.
#[derive(Debug, Clone)]
pub struct AxeEngine {
    source: AxeSource,
    injection_timeout: Duration,
    disabled_rules: Vec<String>,
}

impl AxeEngine {
    /// Create an adapter injecting axe-core from `source`.
    #[must_use]
    pub fn new(source: AxeSource) -> Self {
        Self {
            source,
            injection_timeout: Duration::from_secs(10),
            disabled_rules: Vec::new(),
        }
    }

    /// Build from engine settings. A configured `script_path` is read now.
    pub fn from_config(config: &EngineConfig) -> std::io::Result<Self> {
        let source = match &config.script_path {
            Some(path) => {
                tracing::debug!("Using local axe-core build at {}", path.display());
                AxeSource::Inline(std::fs::read_to_string(path)?.into())
            }
            None => AxeSource::Url(config.script_url.clone()),
        };

        Ok(Self::new(source)
            .with_injection_timeout(config.injection_timeout())
            .with_disabled_rules(config.disabled_rules.clone()))
    }

    /// Set how long to wait for the engine to become available.
    #[must_use]
    pub fn with_injection_timeout(mut self, timeout: Duration) -> Self {
        self.injection_timeout = timeout;
        self
    }

    /// Switch off the given rule ids for every run.
    #[must_use]
    pub fn with_disabled_rules(mut self, rules: Vec<String>) -> Self {
        self.disabled_rules = rules;
        self
    }

    /// Options `evaluate` passes to `axe.run` for `level`.
    #[must_use]
    pub fn run_options(&self, level: ConformanceLevel) -> RunOptions {
        RunOptions::new(level, &self.disabled_rules)
    }

    /// Make sure `axe` is defined in the page. A page that already has it
    /// is left untouched.
    pub async fn inject(&self, context: &mut PageContext) -> Result<()> {
        if is_loaded(context).await? {
            tracing::debug!(url = context.url(), "axe-core already present");
            return Ok(());
        }

        let script = match &self.source {
            AxeSource::Url(src) => script_tag_injection(src),
            AxeSource::Inline(text) => format!("{text}\n;typeof window.axe !== 'undefined'"),
        };
        context
            .execute_script(&script)
            .await
            .map_err(|e| injection_failed(context, e.to_string()))?;

        let started = Instant::now();
        loop {
            if is_loaded(context).await? {
                tracing::debug!(url = context.url(), "axe-core injected");
                return Ok(());
            }
            if script_errored(context).await? {
                return Err(injection_failed(
                    context,
                    "axe-core script failed to load".to_string(),
                ));
            }
            if started.elapsed() >= self.injection_timeout {
                return Err(injection_failed(
                    context,
                    format!("axe-core not available after {:?}", self.injection_timeout),
                ));
            }
            tokio::time::sleep(INJECTION_POLL_INTERVAL).await;
        }
    }

    async fn run(&self, context: &mut PageContext, level: ConformanceLevel) -> Result<RawEngineResult> {
        let options = self
            .run_options(level)
            .to_json()
            .map_err(|e| execution_failed(context, e.to_string()))?;

        let script = format!(
            "axe.run(document, {options}).then(r => ({{ \
             violations: r.violations, passes: r.passes, \
             incomplete: r.incomplete, inapplicable: r.inapplicable }}))"
        );

        let value = context
            .execute_script(&script)
            .await
            .map_err(|e| execution_failed(context, e.to_string()))?;

        RawEngineResult::from_value(value).map_err(|e| e.into_evaluation_error(context.url()))
    }
}

#[async_trait::async_trait]
impl RuleEngine for AxeEngine {
    async fn evaluate(
        &self,
        context: &mut PageContext,
        level: ConformanceLevel,
    ) -> Result<RawEngineResult> {
        self.inject(context).await?;
        let raw = self.run(context, level).await?;
        tracing::debug!(
            url = context.url(),
            violations = raw.violations.len(),
            passes = raw.passes.len(),
            "axe-core run finished"
        );
        Ok(raw)
    }

    fn name(&self) -> &str {
        "axe-core"
    }
}

fn script_tag_injection(src: &str) -> String {
    // serde_json string output doubles as a safe JavaScript string literal
    let src = serde_json::Value::String(src.to_string());
    format!(
        "(() => {{ \
         if (document.getElementById('{SCRIPT_ELEMENT_ID}')) return false; \
         const s = document.createElement('script'); \
         s.id = '{SCRIPT_ELEMENT_ID}'; s.src = {src}; \
         s.onerror = () => {{ window.__beaconAxeFailed = true; }}; \
         (document.head || document.documentElement).appendChild(s); \
         return true; }})()"
    )
}

async fn is_loaded(context: &mut PageContext) -> Result<bool> {
    probe(context, "typeof window.axe !== 'undefined'").await
}

async fn script_errored(context: &mut PageContext) -> Result<bool> {
    probe(context, "window.__beaconAxeFailed === true").await
}

async fn probe(context: &mut PageContext, expression: &str) -> Result<bool> {
    let value = context
        .execute_script(expression)
        .await
        .map_err(|e| injection_failed(context, e.to_string()))?;
    Ok(value.as_bool().unwrap_or(false))
}

fn injection_failed(context: &PageContext, message: String) -> EvaluationError {
    EvaluationError::InjectionFailed {
        url: context.url().to_string(),
        message,
    }
}

fn execution_failed(context: &PageContext, message: String) -> EvaluationError {
    EvaluationError::ExecutionFailed {
        url: context.url().to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_options_shape() {
        let options = RunOptions::new(ConformanceLevel::AA, &["region".to_string()]);
        let value: serde_json::Value =
            serde_json::from_str(&options.to_json().unwrap()).expect("valid JSON");

        assert_eq!(value["runOnly"]["type"], "tag");
        assert_eq!(value["runOnly"]["values"].as_array().unwrap().len(), 6);
        assert_eq!(value["rules"]["region"]["enabled"], false);
    }

    #[test]
    fn test_run_options_without_disabled_rules() {
        let options = RunOptions::new(ConformanceLevel::A, &[]);
        let value: serde_json::Value =
            serde_json::from_str(&options.to_json().unwrap()).expect("valid JSON");
        assert!(value.get("rules").is_none());
    }

    #[test]
    fn test_aaa_options_include_lower_levels() {
        let engine = AxeEngine::new(AxeSource::Url("https://cdn.example/axe.js".to_string()));
        let options = engine.run_options(ConformanceLevel::AAA);
        let values = options.tag_values();

        for tag in ["wcag2a", "wcag21a", "wcag22a", "wcag2aa", "wcag22aa", "wcag22aaa"] {
            assert!(values.iter().any(|v| v == tag), "missing {tag}");
        }
    }

    #[test]
    fn test_script_tag_injection_quotes_source() {
        let script = script_tag_injection("https://cdn.example/axe.js?v=\"4\"");
        assert!(script.contains(r#"s.src = "https://cdn.example/axe.js?v=\"4\"";"#));
        assert!(script.contains(SCRIPT_ELEMENT_ID));
    }

    #[test]
    fn test_from_config_defaults_to_url() {
        let engine = AxeEngine::from_config(&EngineConfig::default()).expect("build engine");
        assert!(matches!(engine.source, AxeSource::Url(ref u) if u.contains("axe-core/4.8.2")));
        assert_eq!(engine.injection_timeout, Duration::from_secs(10));
    }
}
