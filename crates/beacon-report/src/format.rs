//! Report formats and dispatch.

use crate::error::{ReportError, Result};
use crate::{html, markdown};
use beacon_core::AuditResult;
use std::fmt;
use std::str::FromStr;

/// Output format requested by the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// The raw `AuditResult` document
    #[default]
    Json,
    Markdown,
    Html,
    /// Every format above
    All,
}

impl ReportFormat {
    /// Concrete formats this selection expands to.
    #[must_use]
    pub fn expand(self) -> &'static [ReportFormat] {
        match self {
            Self::Json => &[Self::Json],
            Self::Markdown => &[Self::Markdown],
            Self::Html => &[Self::Html],
            Self::All => &[Self::Json, Self::Markdown, Self::Html],
        }
    }

    /// File extension for a concrete format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json | Self::All => "json",
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Markdown => write!(f, "markdown"),
            Self::Html => write!(f, "html"),
            Self::All => write!(f, "all"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "all" => Ok(Self::All),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

/// One rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub format: ReportFormat,
    pub contents: String,
}

/// Render `result` in every format `format` expands to.
pub fn render(result: &AuditResult, format: ReportFormat) -> Result<Vec<RenderedReport>> {
    format
        .expand()
        .iter()
        .map(|&format| {
            let contents = match format {
                ReportFormat::Json | ReportFormat::All => serde_json::to_string_pretty(result)?,
                ReportFormat::Markdown => markdown::render_markdown(result),
                ReportFormat::Html => html::render_html(result),
            };
            Ok(RenderedReport { format, contents })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("Markdown".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!(" HTML ".parse::<ReportFormat>().unwrap(), ReportFormat::Html);
        assert_eq!("all".parse::<ReportFormat>().unwrap(), ReportFormat::All);
        assert!(matches!(
            "pdf".parse::<ReportFormat>(),
            Err(ReportError::UnknownFormat(f)) if f == "pdf"
        ));
    }

    #[test]
    fn test_all_expands_to_concrete_formats() {
        let formats = ReportFormat::All.expand();
        assert_eq!(formats.len(), 3);
        let extensions: Vec<_> = formats.iter().map(|f| f.extension()).collect();
        assert_eq!(extensions, vec!["json", "md", "html"]);
    }
}
