//! JSON artifacts for audit results.
//!
//! A batch is written as one document per input URL plus an `index.json`
//! that lists every entry in input order. File names are derived from the
//! URL and made unique within the batch.

use crate::batch::{AuditOutcome, BatchResult, FailureKind, FailureRecord};
use crate::error::{Result, ScanError};
use beacon_core::{AuditResult, Timestamp};
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use uuid::Uuid;

/// Name of the batch index document.
pub const INDEX_FILE: &str = "index.json";

/// Longest stem taken verbatim from a URL. Longer stems are cut and tagged
/// with a digest of the full URL so names stay under filesystem limits.
pub const MAX_STEM_BYTES: usize = 120;

const DIGEST_HEX_CHARS: usize = 12;

/// Sanitized file stem for `url`, without extension.
///
/// The result is at most `MAX_STEM_BYTES` plus a short digest suffix.
#[must_use]
pub fn file_stem_for(url: &str) -> String {
    static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();
    let regex = UNSAFE_CHARS.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid regex"));

    let trimmed = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let stem = regex.replace_all(trimmed, "_");
    let stem = stem.trim_matches('.');

    if stem.is_empty() {
        return "page".to_string();
    }
    if stem.len() <= MAX_STEM_BYTES {
        return stem.to_string();
    }

    let mut cut = MAX_STEM_BYTES;
    while !stem.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}-{}", &stem[..cut], &digest[..DIGEST_HEX_CHARS])
}

/// Hands out unique artifact names within one batch.
///
/// Names are compared case-insensitively so they stay distinct on
/// case-folding filesystems.
#[derive(Debug, Default)]
pub struct ArtifactNamer {
    taken: HashSet<String>,
}

impl ArtifactNamer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Namer for a batch directory; the index name is never handed out.
    #[must_use]
    pub fn for_batch() -> Self {
        let mut namer = Self::new();
        namer
            .taken
            .insert(INDEX_FILE.trim_end_matches(".json").to_string());
        namer
    }

    /// Next unused file stem for `url`.
    pub fn next_stem(&mut self, url: &str) -> String {
        let stem = file_stem_for(url);
        let mut candidate = stem.clone();
        let mut n = 2;
        while !self.taken.insert(candidate.to_lowercase()) {
            candidate = format!("{stem}-{n}");
            n += 1;
        }
        candidate
    }

    /// Next unused JSON file name for `url`.
    pub fn name_for(&mut self, url: &str) -> String {
        format!("{}.json", self.next_stem(url))
    }
}

/// Write one audit result as pretty JSON, creating parent directories.
pub fn write_audit(path: &Path, result: &AuditResult) -> Result<()> {
    write_json(path, result)
}

#[derive(Serialize)]
struct FailureDocument<'a> {
    url: &'a str,
    error: FailureDetail<'a>,
    timestamp: Timestamp,
}

#[derive(Serialize)]
struct FailureDetail<'a> {
    kind: FailureKind,
    message: &'a str,
}

impl<'a> From<&'a FailureRecord> for FailureDocument<'a> {
    fn from(record: &'a FailureRecord) -> Self {
        Self {
            url: &record.url,
            error: FailureDetail {
                kind: record.kind,
                message: &record.message,
            },
            timestamp: record.timestamp,
        }
    }
}

/// Write one failure record as pretty JSON, creating parent directories.
pub fn write_failure(path: &Path, record: &FailureRecord) -> Result<()> {
    write_json(path, &FailureDocument::from(record))
}

#[derive(Serialize)]
struct BatchIndex<'a> {
    run_id: Uuid,
    started_at: Timestamp,
    finished_at: Timestamp,
    entries: Vec<IndexEntry<'a>>,
}

#[derive(Serialize)]
struct IndexEntry<'a> {
    url: &'a str,
    file: String,
    status: &'static str,
}

/// Write every batch entry to `dir` plus an index, returning the paths
/// written in input order (index last).
pub fn write_batch(dir: &Path, batch: &BatchResult) -> Result<Vec<PathBuf>> {
    let mut namer = ArtifactNamer::for_batch();

    let mut written = Vec::with_capacity(batch.len() + 1);
    let mut index = Vec::with_capacity(batch.len());

    for entry in batch.entries() {
        let file = namer.name_for(&entry.url);
        let path = dir.join(&file);
        let status = match &entry.outcome {
            AuditOutcome::Audited(result) => {
                write_audit(&path, result)?;
                "audited"
            }
            AuditOutcome::Failed(record) => {
                write_failure(&path, record)?;
                "failed"
            }
        };
        index.push(IndexEntry {
            url: &entry.url,
            file,
            status,
        });
        written.push(path);
    }

    let index_path = dir.join(INDEX_FILE);
    write_json(
        &index_path,
        &BatchIndex {
            run_id: batch.run_id,
            started_at: batch.started_at,
            finished_at: batch.finished_at,
            entries: index,
        },
    )?;
    written.push(index_path);

    tracing::info!("Wrote {} artifacts to {}", written.len(), dir.display());
    Ok(written)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let io_error = |source| ScanError::Artifact {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(io_error)?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}
