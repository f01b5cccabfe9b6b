//! Configuration management for beacon.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::types::ConformanceLevel;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// axe-core build injected when no local script is configured.
pub const DEFAULT_AXE_SCRIPT_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/axe-core/4.8.2/axe.min.js";

/// Main application configuration.
///
/// This is loaded from `~/.config/beacon/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Audit execution settings
    pub audit: AuditConfig,
    /// Rule engine settings
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::from_path(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }
        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `BEACON_HEADLESS`: Override browser headless mode (true/false)
    /// - `BEACON_PAGE_TIMEOUT_SECS`: Override the per-page timeout
    /// - `BEACON_CONCURRENCY`: Override the number of concurrent audits
    /// - `BEACON_CONFORMANCE`: Override the default conformance level
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env();
        Ok(config)
    }

    /// Apply environment overrides on top of the current values.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("BEACON_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Ok(val) = std::env::var("BEACON_PAGE_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.audit.page_timeout_secs = secs;
                tracing::debug!("Override audit.page_timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("BEACON_CONCURRENCY") {
            if let Ok(concurrent) = val.parse() {
                self.audit.concurrent_audits = concurrent;
                tracing::debug!("Override audit.concurrent_audits from env: {}", concurrent);
            }
        }

        if let Ok(val) = std::env::var("BEACON_CONFORMANCE") {
            match val.parse() {
                Ok(level) => {
                    self.audit.conformance = level;
                    tracing::debug!("Override audit.conformance from env: {}", level);
                }
                Err(e) => tracing::debug!("Ignoring BEACON_CONFORMANCE: {}", e),
            }
        }
    }

    /// Check values that would make an audit run meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.audit.page_timeout_secs == 0 {
            return Err(invalid("audit.page_timeout_secs", "must be positive"));
        }
        if self.audit.max_page_timeout_secs < self.audit.page_timeout_secs {
            return Err(invalid(
                "audit.max_page_timeout_secs",
                "must not be below audit.page_timeout_secs",
            ));
        }
        if self.audit.concurrent_audits == 0 {
            return Err(invalid("audit.concurrent_audits", "must be at least 1"));
        }
        if self.audit.retry_attempts == 0 {
            return Err(invalid("audit.retry_attempts", "must be at least 1"));
        }
        if self.engine.injection_timeout_secs == 0 {
            return Err(invalid("engine.injection_timeout_secs", "must be positive"));
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| invalid("config_path", "no parent directory"))?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/beacon/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("org", "beacon", "beacon").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Explicit Chrome/Chromium executable; auto-detected when unset
    pub executable: Option<PathBuf>,
    /// How long to wait for the browser process to come up
    pub launch_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            executable: None,
            launch_timeout_secs: 20,
        }
    }
}

/// Audit execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Conformance level used when the caller does not pick one
    pub conformance: ConformanceLevel,
    /// Page load timeout in seconds
    pub page_timeout_secs: u64,
    /// Ceiling for page timeout overrides
    pub max_page_timeout_secs: u64,
    /// Number of pages audited at once (1 = sequential)
    pub concurrent_audits: usize,
    /// Total attempts for retryable page load failures
    pub retry_attempts: u32,
    /// Base delay between attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            conformance: ConformanceLevel::AA,
            page_timeout_secs: 10,
            max_page_timeout_secs: 30,
            concurrent_audits: 1,
            retry_attempts: 2,
            retry_delay_ms: 1000,
        }
    }
}

impl AuditConfig {
    /// Resolve the page timeout for a run.
    ///
    /// `requested` falls back to `page_timeout_secs`; values above
    /// `max_page_timeout_secs` are clamped to it.
    pub fn page_timeout(&self, requested: Option<u64>) -> ConfigResult<Duration> {
        let secs = requested.unwrap_or(self.page_timeout_secs);
        if secs == 0 {
            return Err(invalid("page_timeout_secs", "must be positive"));
        }
        if secs > self.max_page_timeout_secs {
            tracing::warn!(
                "Page timeout {}s exceeds ceiling of {}s, clamping",
                secs,
                self.max_page_timeout_secs
            );
            return Ok(Duration::from_secs(self.max_page_timeout_secs));
        }
        Ok(Duration::from_secs(secs))
    }

    /// Base delay between retry attempts.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Rule engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where the page fetches axe-core from
    pub script_url: String,
    /// Local axe-core build; takes precedence over `script_url`
    pub script_path: Option<PathBuf>,
    /// How long to wait for the injected engine to become available
    pub injection_timeout_secs: u64,
    /// Rule identifiers switched off for every run
    pub disabled_rules: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            script_url: DEFAULT_AXE_SCRIPT_URL.to_string(),
            script_path: None,
            injection_timeout_secs: 10,
            disabled_rules: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Injection timeout as a `Duration`.
    #[must_use]
    pub fn injection_timeout(&self) -> Duration {
        Duration::from_secs(self.injection_timeout_secs)
    }
}
