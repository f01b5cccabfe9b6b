//! Beacon Scanner - batch audit orchestration.
//!
//! This crate turns a list of audit targets into a [`BatchResult`]: each page
//! is loaded in its own browser session, evaluated by a [`RuleEngine`],
//! normalized into an [`AuditResult`](beacon_core::AuditResult) and slotted
//! back in input order.
//!
//! # Features
//!
//! - Bounded concurrency with results kept in input order
//! - Retry with linear backoff for page load timeouts and navigation failures
//! - Cooperative cancellation through a `CancellationToken`
//! - Per-URL failure records; only an unavailable browser aborts a batch
//! - Collision-safe JSON artifacts with a batch index
//!
//! # Example
//!
//! ```rust,ignore
//! use beacon_browser::ChromiumLauncher;
//! use beacon_core::{AuditTarget, ConformanceLevel};
//! use beacon_engine::{AxeEngine, AxeSource};
//! use beacon_scanner::AuditOrchestrator;
//! use std::sync::Arc;
//!
//! let orchestrator = AuditOrchestrator::new(
//!     Arc::new(ChromiumLauncher::new(config.browser.clone())),
//!     Arc::new(AxeEngine::new(AxeSource::Url(script_url))),
//! )
//! .with_max_concurrent_audits(2);
//!
//! let batch = orchestrator
//!     .run_batch(AuditTarget::many(urls, ConformanceLevel::AA))
//!     .await?;
//! ```
//!
//! [`RuleEngine`]: beacon_engine::RuleEngine

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod artifact;
pub mod batch;
pub mod error;
pub mod normalizer;
pub mod orchestrator;

pub use artifact::{
    file_stem_for, write_audit, write_batch, write_failure, ArtifactNamer, INDEX_FILE,
    MAX_STEM_BYTES,
};
pub use batch::{AuditOutcome, BatchEntry, BatchResult, FailureKind, FailureRecord};
pub use error::{AuditFailure, Result, ScanError};
pub use normalizer::{accessibility_score, normalize};
pub use orchestrator::AuditOrchestrator;
