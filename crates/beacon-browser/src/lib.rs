//! Browser automation for accessibility audits.
//!
//! Provides the browser/driver boundary ([`BrowserSession`], [`SessionFactory`]),
//! a Chromium implementation of it, and the [`PageLoader`] that turns a URL
//! into a ready [`PageContext`] with a guaranteed session teardown.

pub mod actions;
pub mod engine;
pub mod error;
pub mod loader;

pub use actions::{validate_audit_url, BrowserSession, SessionFactory};
pub use engine::{ChromiumLauncher, ChromiumSession};
pub use error::{BrowserError, LoadError, Result};
pub use loader::{PageContext, PageLoader};
