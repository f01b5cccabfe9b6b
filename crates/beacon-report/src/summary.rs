//! Console summary of a batch.

use beacon_scanner::{AuditOutcome, BatchResult};

/// One line per URL in input order, followed by a totals line.
#[must_use]
pub fn render_summary(batch: &BatchResult) -> String {
    let mut out = String::new();
    let width = batch.len().to_string().len();

    for (i, entry) in batch.entries().iter().enumerate() {
        let status = match &entry.outcome {
            AuditOutcome::Audited(result) => format!(
                "{} violations, score {}%",
                result.summary.violations, result.score
            ),
            AuditOutcome::Failed(record) => {
                format!("ERROR ({}) {}", record.kind, record.message)
            }
        };
        out.push_str(&format!(
            "[{:>width$}/{}] {} [{}]: {}\n",
            i + 1,
            batch.len(),
            entry.url,
            entry.conformance_level,
            status
        ));
    }

    let audited = batch.successes().count();
    let violations: usize = batch.successes().map(|r| r.summary.violations).sum();
    out.push_str(&format!(
        "{} of {} pages audited, {} failed, {} violations total\n",
        audited,
        batch.len(),
        batch.len() - audited,
        violations
    ));
    out
}
