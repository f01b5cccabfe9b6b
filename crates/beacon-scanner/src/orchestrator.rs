//! Batch orchestrator for auditing many pages.
//!
//! This module provides the `AuditOrchestrator`, which runs the load,
//! evaluate and normalize pipeline for each target with retry logic,
//! bounded concurrency and cooperative cancellation.

use crate::batch::{AuditOutcome, BatchEntry, BatchResult, FailureRecord};
use crate::error::{AuditFailure, Result, ScanError};
use crate::normalizer::normalize;
use beacon_browser::{LoadError, PageContext, PageLoader, SessionFactory};
use beacon_core::{AuditResult, AuditTarget, Timestamp};
use beacon_engine::{restrict_to_level, RuleEngine};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Default total attempts for a retryable page load.
const DEFAULT_RETRY_ATTEMPTS: u32 = 2;

/// Default base delay between load attempts.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Default page readiness budget.
const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Orchestrates audits across a batch of targets.
pub struct AuditOrchestrator {
    /// Opens a fresh browser session per page
    loader: PageLoader,
    /// Rule engine evaluated against every loaded page
    engine: Arc<dyn RuleEngine>,
    /// Readiness budget for each page load
    page_timeout: Duration,
    /// Maximum audits in flight at once
    max_concurrent_audits: usize,
    /// Total attempts for retryable load failures
    retry_attempts: u32,
    /// Base delay; attempt `n` waits `n * retry_delay`
    retry_delay: Duration,
    cancel: CancellationToken,
}

impl AuditOrchestrator {
    /// Create an orchestrator that audits sequentially.
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionFactory>, engine: Arc<dyn RuleEngine>) -> Self {
        Self {
            loader: PageLoader::new(sessions),
            engine,
            page_timeout: DEFAULT_PAGE_TIMEOUT,
            max_concurrent_audits: 1,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            cancel: CancellationToken::new(),
        }
    }

    /// Set the maximum number of concurrent audits. Zero is treated as one.
    #[must_use]
    pub fn with_max_concurrent_audits(mut self, max: usize) -> Self {
        self.max_concurrent_audits = max.max(1);
        self
    }

    /// Set the per-page readiness timeout.
    #[must_use]
    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Set total load attempts (at least one) and the base backoff delay.
    #[must_use]
    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts.max(1);
        self.retry_delay = delay;
        self
    }

    /// Use `token` to cancel batches run by this orchestrator.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels batches run by this orchestrator.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Audit every target and return one entry per target, in input order.
    ///
    /// Per-URL failures are recorded in the result. Only an unavailable
    /// browser driver fails the whole call.
    pub async fn run_batch(&self, targets: Vec<AuditTarget>) -> Result<BatchResult> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("batch", %run_id, targets = targets.len());

        async move {
            let started_at = Timestamp::now();
            tracing::info!(
                "Starting batch of {} targets (concurrency {})",
                targets.len(),
                self.max_concurrent_audits
            );

            let mut slots: Vec<Option<AuditOutcome>> = vec![None; targets.len()];
            let mut in_flight = FuturesUnordered::new();

            for (index, target) in targets.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    tracing::warn!("Batch cancelled with {} targets not started", targets.len() - index);
                    break;
                }

                in_flight.push(self.audit_slot(index, target));

                // Respect concurrency limit
                while in_flight.len() >= self.max_concurrent_audits {
                    if let Some((index, result)) = in_flight.next().await {
                        settle(&mut slots, &targets, index, result)?;
                    }
                }
            }

            // Collect remaining results
            while let Some((index, result)) = in_flight.next().await {
                settle(&mut slots, &targets, index, result)?;
            }
            drop(in_flight);

            let entries = targets
                .into_iter()
                .zip(slots)
                .map(|(target, slot)| {
                    let outcome = slot.unwrap_or_else(|| {
                        AuditOutcome::Failed(FailureRecord::cancelled(target.url.clone()))
                    });
                    BatchEntry {
                        url: target.url,
                        conformance_level: target.level,
                        outcome,
                    }
                })
                .collect();

            let batch = BatchResult::new(run_id, started_at, Timestamp::now(), entries);
            tracing::info!(
                "Batch finished: {} audited, {} failed",
                batch.successes().count(),
                batch.failures().count()
            );
            Ok(batch)
        }
        .instrument(span)
        .await
    }

    /// Load, evaluate and normalize a single target.
    ///
    /// The browser session is released before this returns, whatever the
    /// outcome.
    pub async fn audit_one(
        &self,
        target: &AuditTarget,
    ) -> std::result::Result<AuditResult, AuditFailure> {
        let mut context = self.load_with_retry(&target.url).await?;

        let evaluated = self.engine.evaluate(&mut context, target.level).await;
        let timestamp = Timestamp::now();
        context.release().await;

        let mut raw = evaluated?;
        if !self.engine.applies_tag_filter() {
            raw = restrict_to_level(&raw, target.level);
        }

        let result = normalize(&raw, &target.url, timestamp, target.level);
        tracing::info!(
            violations = result.summary.violations,
            passes = result.summary.passes,
            score = result.score,
            "Audit complete"
        );
        Ok(result)
    }

    /// Audit one target, racing it against cancellation.
    async fn audit_slot(
        &self,
        index: usize,
        target: &AuditTarget,
    ) -> (usize, std::result::Result<AuditResult, AuditFailure>) {
        let span = tracing::info_span!("audit", url = %target.url, position = index + 1);

        let result = async {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => Err(AuditFailure::Cancelled),
                result = self.audit_one(target) => result,
            }
        }
        .instrument(span)
        .await;

        (index, result)
    }

    /// Load a page, retrying timeouts and navigation failures with linear
    /// backoff.
    async fn load_with_retry(&self, url: &str) -> std::result::Result<PageContext, LoadError> {
        let mut attempt = 1;
        loop {
            match self.loader.load(url, self.page_timeout).await {
                Ok(context) => return Ok(context),
                Err(e) if e.is_retryable() && attempt < self.retry_attempts => {
                    let delay = self.retry_delay * attempt;
                    tracing::warn!(
                        "Load failed for {} (attempt {}/{}), retrying in {:?}: {}",
                        url,
                        attempt,
                        self.retry_attempts,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Store one finished audit in its input slot, or abort on a fatal failure.
fn settle(
    slots: &mut [Option<AuditOutcome>],
    targets: &[AuditTarget],
    index: usize,
    result: std::result::Result<AuditResult, AuditFailure>,
) -> Result<()> {
    let url = &targets[index].url;
    let outcome = match result {
        Ok(audit) => AuditOutcome::Audited(Box::new(audit)),
        Err(AuditFailure::Load(source @ LoadError::DriverUnavailable { .. })) => {
            tracing::error!("Aborting batch: {}", source);
            return Err(ScanError::DriverUnavailable {
                url: url.clone(),
                source,
            });
        }
        Err(failure) => {
            tracing::warn!(url = %url, "Audit failed: {}", failure);
            AuditOutcome::Failed(FailureRecord::from_failure(url, &failure))
        }
    };
    slots[index] = Some(outcome);
    Ok(())
}
