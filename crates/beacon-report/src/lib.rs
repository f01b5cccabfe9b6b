//! Human-readable reports for beacon audits.
//!
//! Renders a single [`AuditResult`](beacon_core::AuditResult) as Markdown or
//! self-contained HTML, and a [`BatchResult`](beacon_scanner::BatchResult)
//! as a console summary. The JSON artifact is the `AuditResult` itself.

pub mod error;
pub mod format;
pub mod html;
pub mod markdown;
pub mod summary;

pub use error::{ReportError, Result};
pub use format::{render, RenderedReport, ReportFormat};
pub use html::render_html;
pub use markdown::render_markdown;
pub use summary::render_summary;
