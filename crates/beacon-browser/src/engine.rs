use crate::actions::{BrowserSession, SessionFactory};
use crate::error::{BrowserError, Result};
use beacon_core::BrowserConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use futures::stream::StreamExt;
use std::time::Duration;
use tokio::time::Instant;
use tokio::task::JoinHandle;

/// How often readiness is re-checked while waiting for a page.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launches one Chromium process per session.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    config: BrowserConfig,
}

impl ChromiumLauncher {
    /// Create a launcher from browser settings.
    #[must_use]
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Show the browser window instead of running headless.
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.config.headless = !visible;
        self
    }

    fn chrome_config(&self) -> Result<ChromeConfig> {
        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(self.config.window_width, self.config.window_height)
            .launch_timeout(Duration::from_secs(self.config.launch_timeout_secs))
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(executable) = &self.config.executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(BrowserError::Launch)
    }
}

#[async_trait::async_trait]
impl SessionFactory for ChromiumLauncher {
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>> {
        let config = self.chrome_config()?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // Drive the CDP connection until the session quits
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("CDP handler event error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(BrowserError::Launch(format!("could not open tab: {e}")));
            }
        };

        tracing::debug!(headless = self.config.headless, "Chromium session started");

        Ok(Box::new(ChromiumSession {
            browser,
            page: Some(page),
            handler_task,
        }))
    }
}

/// A single-tab Chromium session.
pub struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page> {
        self.page.as_ref().ok_or(BrowserError::SessionClosed)
    }
}

#[async_trait::async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page()?
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationError(e.to_string()))?;
        Ok(())
    }

    async fn wait_for_ready(&mut self, timeout: Duration) -> Result<()> {
        poll_ready_state(self, timeout).await
    }

    async fn execute_script(&mut self, script: &str) -> Result<serde_json::Value> {
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(BrowserError::Script)?;

        let result = self
            .page()?
            .evaluate_expression(params)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn quit(&mut self) -> Result<()> {
        let Some(page) = self.page.take() else {
            return Ok(());
        };

        if let Err(e) = page.close().await {
            tracing::debug!("Closing tab failed: {}", e);
        }
        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| BrowserError::Launch(format!("browser close failed: {e}")));
        let _ = self.browser.wait().await;
        self.handler_task.abort();

        closed.map(|_| ())
    }
}

/// Poll `document.readyState` until it reads `complete`.
///
/// Script errors are retried until the deadline: the execution context is
/// torn down while a client-side redirect swaps documents. Only a closed
/// session ends the wait early.
pub(crate) async fn poll_ready_state<S>(session: &mut S, timeout: Duration) -> Result<()>
where
    S: BrowserSession + ?Sized,
{
    let started = Instant::now();
    loop {
        let last_seen = match session.execute_script("document.readyState").await {
            Ok(state) if state.as_str() == Some("complete") => return Ok(()),
            Ok(state) => format!("document.readyState still {state}"),
            Err(BrowserError::SessionClosed) => return Err(BrowserError::SessionClosed),
            Err(e) => {
                tracing::debug!("Readiness check failed, polling again: {}", e);
                format!("last readiness check failed: {e}")
            }
        };
        if started.elapsed() >= timeout {
            return Err(BrowserError::Timeout(format!("{last_seen} after {timeout:?}")));
        }
        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Session that answers readiness checks from a script, then repeats
    /// the last answer.
    struct ScriptedSession {
        answers: VecDeque<Result<serde_json::Value>>,
        checks: usize,
    }

    impl ScriptedSession {
        fn new(answers: Vec<Result<serde_json::Value>>) -> Self {
            Self {
                answers: answers.into(),
                checks: 0,
            }
        }
    }

    #[async_trait::async_trait]
    impl BrowserSession for ScriptedSession {
        async fn navigate(&mut self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn wait_for_ready(&mut self, timeout: Duration) -> Result<()> {
            poll_ready_state(self, timeout).await
        }

        async fn execute_script(&mut self, _script: &str) -> Result<serde_json::Value> {
            self.checks += 1;
            match self.answers.len() {
                0 => Ok(serde_json::json!("loading")),
                1 => match &self.answers[0] {
                    Ok(value) => Ok(value.clone()),
                    Err(e) => Err(BrowserError::Script(e.to_string())),
                },
                _ => self.answers.pop_front().unwrap_or(Ok(serde_json::Value::Null)),
            }
        }

        async fn quit(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_after_context_destroyed() {
        let mut session = ScriptedSession::new(vec![
            Ok(serde_json::json!("loading")),
            Err(BrowserError::Script(
                "Execution context was destroyed".to_string(),
            )),
            Ok(serde_json::json!("complete")),
        ]);

        session
            .wait_for_ready(Duration::from_secs(10))
            .await
            .expect("ready after redirect");
        assert_eq!(session.checks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_script_error_times_out() {
        let mut session = ScriptedSession::new(vec![Err(BrowserError::Script(
            "Execution context was destroyed".to_string(),
        ))]);

        let err = session
            .wait_for_ready(Duration::from_secs(1))
            .await
            .unwrap_err();
        match err {
            BrowserError::Timeout(message) => {
                assert!(message.contains("Execution context was destroyed"));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(session.checks > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_session_stops_polling() {
        let mut session = ScriptedSession::new(vec![
            Err(BrowserError::SessionClosed),
            Ok(serde_json::json!("complete")),
        ]);

        let err = session
            .wait_for_ready(Duration::from_secs(10))
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::SessionClosed));
        assert_eq!(session.checks, 1);
    }

    #[test]
    fn test_launcher_visibility() {
        let launcher = ChromiumLauncher::new(BrowserConfig::default());
        assert!(launcher.config.headless);

        let launcher = launcher.visible(true);
        assert!(!launcher.config.headless);
    }

    #[test]
    fn test_window_size_from_config() {
        let config = BrowserConfig {
            window_width: 1280,
            window_height: 720,
            ..BrowserConfig::default()
        };
        let launcher = ChromiumLauncher::new(config);
        assert_eq!(launcher.config.window_width, 1280);
        assert_eq!(launcher.config.window_height, 720);
    }
}
