use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unknown report format '{0}', expected json, markdown, html or all")]
    UnknownFormat(String),

    #[error("failed to render JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
