//! Page loading with scoped browser sessions.
//!
//! [`PageLoader::load`] opens one session per call and hands it back inside
//! a [`PageContext`]. The context owns the session: it is quit either through
//! [`PageContext::release`] or, failing that, when the context is dropped.

use crate::actions::{validate_audit_url, BrowserSession, SessionFactory};
use crate::error::{BrowserError, LoadError};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Loads pages into fresh browser sessions.
#[derive(Clone)]
pub struct PageLoader {
    factory: Arc<dyn SessionFactory>,
}

impl PageLoader {
    /// Create a loader that draws sessions from `factory`.
    #[must_use]
    pub fn new(factory: Arc<dyn SessionFactory>) -> Self {
        Self { factory }
    }

    /// Navigate a new session to `url` and wait until the document is ready.
    ///
    /// Navigation and readiness share one `timeout` budget. On any failure
    /// after the session opened, the session is quit before returning.
    pub async fn load(&self, url: &str, timeout: Duration) -> Result<PageContext, LoadError> {
        let parsed = validate_audit_url(url)?;

        let session = self
            .factory
            .open_session()
            .await
            .map_err(|e| LoadError::DriverUnavailable {
                message: e.to_string(),
            })?;

        let mut context = PageContext::new(url, parsed, session);

        let opened = tokio::time::timeout(timeout, context.open(timeout)).await;
        match opened {
            Ok(Ok(())) => {
                tracing::debug!(url, "Page ready");
                Ok(context)
            }
            Ok(Err(BrowserError::Timeout(_))) | Err(_) => {
                context.release().await;
                Err(LoadError::Timeout {
                    url: url.to_string(),
                    timeout,
                })
            }
            Ok(Err(e)) => {
                context.release().await;
                Err(LoadError::NavigationFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

/// A loaded page and the browser session that holds it.
pub struct PageContext {
    url: String,
    parsed: Url,
    session: Option<Box<dyn BrowserSession>>,
}

impl PageContext {
    fn new(url: &str, parsed: Url, session: Box<dyn BrowserSession>) -> Self {
        Self {
            url: url.to_string(),
            parsed,
            session: Some(session),
        }
    }

    async fn open(&mut self, timeout: Duration) -> Result<(), BrowserError> {
        let url = self.parsed.to_string();
        let session = self.session_mut()?;
        session.navigate(&url).await?;
        session.wait_for_ready(timeout).await
    }

    fn session_mut(&mut self) -> Result<&mut Box<dyn BrowserSession>, BrowserError> {
        self.session.as_mut().ok_or(BrowserError::SessionClosed)
    }

    /// URL as the caller supplied it.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parsed form of the URL.
    #[must_use]
    pub fn parsed_url(&self) -> &Url {
        &self.parsed
    }

    /// Whether the session is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Evaluate a script in the loaded page.
    pub async fn execute_script(&mut self, script: &str) -> Result<serde_json::Value, BrowserError> {
        self.session_mut()?.execute_script(script).await
    }

    /// Quit the browser session now.
    pub async fn release(mut self) {
        self.quit_session().await;
    }

    async fn quit_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.quit().await {
                tracing::warn!(url = %self.url, "Failed to quit browser session: {}", e);
            }
        }
    }
}

impl Drop for PageContext {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        let url = std::mem::take(&mut self.url);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = session.quit().await {
                        tracing::warn!(url = %url, "Failed to quit dropped browser session: {}", e);
                    }
                });
            }
            Err(_) => {
                tracing::error!(url = %url, "No async runtime left to quit browser session");
            }
        }
    }
}
