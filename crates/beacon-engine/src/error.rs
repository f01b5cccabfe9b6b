use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvaluationError>;

/// Failures while running the rule engine against a loaded page.
///
/// Both kinds end the audit of that one URL; neither affects the batch.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("rule engine injection failed for {url}: {message}")]
    InjectionFailed { url: String, message: String },

    #[error("rule engine execution failed for {url}: {message}")]
    ExecutionFailed { url: String, message: String },
}

impl EvaluationError {
    /// URL of the page being evaluated.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::InjectionFailed { url, .. } | Self::ExecutionFailed { url, .. } => url,
        }
    }
}

/// The engine returned something that does not match the expected result shape.
#[derive(Debug, Error)]
#[error("unexpected rule engine result shape: {0}")]
pub struct NormalizationError(pub String);

impl NormalizationError {
    /// Report a malformed result as an execution failure for `url`.
    #[must_use]
    pub fn into_evaluation_error(self, url: &str) -> EvaluationError {
        EvaluationError::ExecutionFailed {
            url: url.to_string(),
            message: self.to_string(),
        }
    }
}

impl From<serde_json::Error> for NormalizationError {
    fn from(err: serde_json::Error) -> Self {
        Self(err.to_string())
    }
}
