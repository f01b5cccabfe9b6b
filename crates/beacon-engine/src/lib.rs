//! Rule engine boundary for beacon.
//!
//! The [`RuleEngine`] trait is the seam the audit pipeline evaluates pages
//! through; [`AxeEngine`] implements it by injecting axe-core into the page
//! and running it with a tag filter derived from the conformance level.
//! [`RawEngineResult`] is the engine's untouched output.

pub mod adapter;
pub mod error;
pub mod filter;
pub mod raw;

pub use adapter::{AxeEngine, AxeSource, RuleEngine, RunOptions};
pub use error::{EvaluationError, NormalizationError, Result};
pub use filter::restrict_to_level;
pub use raw::{RawEngineResult, RawNode, RawRuleOutcome};
