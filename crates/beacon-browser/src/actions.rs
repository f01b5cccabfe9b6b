use crate::error::{LoadError, Result};
use std::time::Duration;
use url::Url;

/// One live browser session: a single tab the loader drives.
#[async_trait::async_trait]
pub trait BrowserSession: Send {
    /// Navigate to a URL
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Block until the document reports ready or `timeout` elapses
    async fn wait_for_ready(&mut self, timeout: Duration) -> Result<()>;

    /// Evaluate a script in the page and return its JSON value.
    /// Promises are awaited.
    async fn execute_script(&mut self, script: &str) -> Result<serde_json::Value>;

    /// Shut the session down. Calling it twice is harmless.
    async fn quit(&mut self) -> Result<()>;
}

/// Opens fresh browser sessions.
#[async_trait::async_trait]
pub trait SessionFactory: Send + Sync {
    /// Start a new session
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>>;
}

/// Check that `url` is something a browser audit can load: an absolute
/// `http` or `https` URL with a host.
pub fn validate_audit_url(url: &str) -> std::result::Result<Url, LoadError> {
    let invalid = |message: String| LoadError::InvalidUrl {
        url: url.to_string(),
        message,
    };

    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "unsupported scheme '{}', expected http or https",
            parsed.scheme()
        )));
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("no host in URL".to_string()));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_audit_url() {
        let url = validate_audit_url("https://example.com/path").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert!(validate_audit_url("http://subdomain.example.com:8080/path").is_ok());
    }

    #[test]
    fn test_validate_audit_url_invalid() {
        for url in ["not-a-url", "/relative/path", "ftp://example.com", "file:///etc/hosts", ""] {
            let err = validate_audit_url(url).unwrap_err();
            assert!(
                matches!(err, LoadError::InvalidUrl { .. }),
                "expected InvalidUrl for {url:?}"
            );
        }
    }
}
