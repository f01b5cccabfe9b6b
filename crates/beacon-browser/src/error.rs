use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

/// Low-level failures reported by a browser session.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("browser session already closed")]
    SessionClosed,
}

/// Why a page could not be loaded.
///
/// Kinds are kept apart because callers treat them differently: timeouts
/// and navigation failures may be retried, an unavailable driver ends the
/// whole batch.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("timed out after {timeout:?} waiting for {url}")]
    Timeout { url: String, timeout: Duration },

    #[error("navigation to {url} failed: {message}")]
    NavigationFailed { url: String, message: String },

    #[error("browser driver unavailable: {message}")]
    DriverUnavailable { message: String },
}

impl LoadError {
    /// Whether another attempt at the same URL might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::NavigationFailed { .. })
    }

    /// Whether no further page can be loaded in this environment.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DriverUnavailable { .. })
    }

    /// URL the failure belongs to; `None` for environment-wide failures.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::InvalidUrl { url, .. }
            | Self::Timeout { url, .. }
            | Self::NavigationFailed { url, .. } => Some(url),
            Self::DriverUnavailable { .. } => None,
        }
    }
}
