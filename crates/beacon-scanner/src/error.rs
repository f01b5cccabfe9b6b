use beacon_browser::LoadError;
use beacon_engine::EvaluationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a batch. Per-URL problems never surface here; they are
/// recorded in the batch result instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("browser driver unavailable while auditing {url}: {source}")]
    DriverUnavailable {
        url: String,
        #[source]
        source: LoadError,
    },

    #[error("failed to write artifact {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize results: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Why a single URL's audit produced no result.
#[derive(Debug, Error)]
pub enum AuditFailure {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("audit cancelled before completion")]
    Cancelled,
}

impl AuditFailure {
    /// Whether this failure rules out every remaining target as well.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Load(e) if e.is_fatal())
    }
}
