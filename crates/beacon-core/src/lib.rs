//! Beacon Core - Foundation crate for the beacon accessibility auditor.
//!
//! This crate provides shared types, the conformance filter, error handling
//! and configuration management that all other beacon crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Audit data model (`AuditTarget`, `RuleOutcome`, `AuditResult`)
//! - [`conformance`] - Rule-engine tags selected by each conformance level
//!
//! # Example
//!
//! ```rust
//! use beacon_core::{tags_for, AppConfig, ConformanceLevel};
//!
//! let config = AppConfig::default();
//! let tags = tags_for(config.audit.conformance);
//! assert!(tags.contains("wcag22aa"));
//! assert!(!tags.contains("wcag22aaa"));
//! assert_eq!(ConformanceLevel::default(), ConformanceLevel::AA);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod conformance;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, AuditConfig, BrowserConfig, EngineConfig, DEFAULT_AXE_SCRIPT_URL};
pub use conformance::{in_scope, level_tags, tags_for};
pub use error::{BeaconError, ConfigError, ConfigResult, Result};
pub use types::{
    AuditResult, AuditTarget, ConformanceLevel, Impact, NodeDescriptor, RuleOutcome, Summary,
    Timestamp,
};
