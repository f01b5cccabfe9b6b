//! Writing reports to the `--output` location.

use anyhow::{Context, Result};
use beacon_report::{render, ReportFormat};
use beacon_scanner::{write_batch, write_failure, ArtifactNamer, AuditOutcome, BatchResult};
use std::path::{Path, PathBuf};

/// Write the batch's reports under `output` and return the paths written.
///
/// A single-URL batch treats `output` as a file path; with `--format all`
/// each format gets `output`'s stem plus its own extension. A larger batch
/// treats `output` as a directory.
pub fn write_reports(batch: &BatchResult, output: &Path, format: ReportFormat) -> Result<Vec<PathBuf>> {
    if batch.len() == 1 {
        write_single(batch, output, format)
    } else {
        write_directory(batch, output, format)
    }
}

fn write_single(batch: &BatchResult, output: &Path, format: ReportFormat) -> Result<Vec<PathBuf>> {
    let Some(entry) = batch.get(0) else {
        return Ok(Vec::new());
    };

    let path_for = |f: ReportFormat| {
        if format == ReportFormat::All {
            output.with_extension(f.extension())
        } else {
            output.to_path_buf()
        }
    };

    match &entry.outcome {
        AuditOutcome::Audited(result) => {
            let mut written = Vec::new();
            for report in render(result, format)? {
                let path = path_for(report.format);
                write_text(&path, &report.contents)?;
                written.push(path);
            }
            Ok(written)
        }
        AuditOutcome::Failed(record) => {
            if !format.expand().contains(&ReportFormat::Json) {
                tracing::warn!("No {} report for failed audit of {}", format, record.url);
                return Ok(Vec::new());
            }
            let path = path_for(ReportFormat::Json);
            write_failure(&path, record)?;
            Ok(vec![path])
        }
    }
}

fn write_directory(batch: &BatchResult, dir: &Path, format: ReportFormat) -> Result<Vec<PathBuf>> {
    let formats = format.expand();
    let mut written = Vec::new();

    if formats.contains(&ReportFormat::Json) {
        written.extend(write_batch(dir, batch)?);
    }

    let rendered: Vec<_> = formats
        .iter()
        .copied()
        .filter(|f| *f != ReportFormat::Json)
        .collect();
    if rendered.is_empty() {
        return Ok(written);
    }

    // Same stems as the JSON artifacts, so each page's reports sit together
    let mut namer = ArtifactNamer::for_batch();
    for entry in batch.entries() {
        let stem = namer.next_stem(&entry.url);
        let Some(result) = entry.result() else {
            continue;
        };
        for &f in &rendered {
            for report in render(result, f)? {
                let path = dir.join(format!("{stem}.{}", report.format.extension()));
                write_text(&path, &report.contents)?;
                written.push(path);
            }
        }
    }

    Ok(written)
}

fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
