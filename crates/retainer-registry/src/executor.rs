//! Best-effort deletion of package versions.
//!
//! Deletions are independent: a failure is recorded and the batch carries on.
//! At most `concurrency` requests are in flight, each bounded by a timeout.
//! Raising the [`CancelFlag`] stops new requests from starting while letting
//! in-flight ones finish.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use retainer_core::VersionId;

use crate::registry::{DeleteStatus, PackageRegistry};

/// Default number of concurrent delete requests.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Upper bound on concurrent delete requests.
pub const MAX_CONCURRENCY: usize = 8;

/// Configuration for the deletion executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum concurrent requests, within `1..=MAX_CONCURRENCY`.
    pub concurrency: usize,

    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ExecutorConfig {
    /// Sets the concurrency, clamped to `1..=MAX_CONCURRENCY`.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Shared flag that stops new deletions from starting.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag that is not raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once the flag has been raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of deleting one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// The version was deleted.
    Deleted,

    /// The version was already gone.
    AlreadyGone,

    /// The deletion failed; the detail describes why.
    Failed(String),
}

/// Result of deleting one version.
#[derive(Debug, Clone)]
pub struct DeletionResult {
    /// Version that was targeted.
    pub id: VersionId,

    /// What happened.
    pub outcome: DeletionOutcome,

    /// Time taken for the request.
    pub duration: Duration,
}

/// A version that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    /// Version identifier.
    pub id: VersionId,

    /// Failure detail.
    pub detail: String,
}

impl fmt::Display for DeletionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.detail)
    }
}

/// Aggregate outcome of a deletion batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Versions deleted.
    pub succeeded: usize,

    /// Versions that were already gone.
    pub already_gone: usize,

    /// Versions that could not be deleted.
    pub failed: usize,

    /// Versions never attempted because the batch was cancelled.
    pub skipped: usize,

    /// Whether cancellation stopped the batch before every id was attempted.
    pub cancelled: bool,

    /// Details of every failure.
    pub failures: Vec<DeletionFailure>,
}

impl DeletionReport {
    /// Returns the number of versions a request was issued for.
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.succeeded + self.already_gone + self.failed
    }

    /// Returns the number of versions in the batch.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.attempted() + self.skipped
    }

    /// Returns true if every version was handled without failure.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }

    fn record(&mut self, result: &DeletionResult) {
        match &result.outcome {
            DeletionOutcome::Deleted => self.succeeded += 1,
            DeletionOutcome::AlreadyGone => self.already_gone += 1,
            DeletionOutcome::Failed(detail) => {
                self.failed += 1;
                self.failures.push(DeletionFailure {
                    id: result.id,
                    detail: detail.clone(),
                });
            }
        }
    }
}

/// Issues delete requests for a batch of versions.
#[derive(Debug, Clone, Default)]
pub struct DeletionExecutor {
    config: ExecutorConfig,
    cancel: CancelFlag,
}

impl DeletionExecutor {
    /// Creates an executor.
    #[must_use]
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            cancel: CancelFlag::new(),
        }
    }

    /// Uses an externally owned cancellation flag.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the cancellation flag.
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Returns the executor configuration.
    #[must_use]
    pub const fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Deletes every id, calling `on_outcome` as each request completes.
    ///
    /// Never fails: per-item errors and timeouts are collected into the
    /// returned report. Completion order is unspecified.
    pub async fn execute<R, I, F>(
        &self,
        registry: &R,
        ids: I,
        mut on_outcome: F,
    ) -> DeletionReport
    where
        R: PackageRegistry + ?Sized,
        I: IntoIterator<Item = VersionId>,
        F: FnMut(&DeletionResult),
    {
        let ids: Vec<VersionId> = ids.into_iter().collect();
        let total = ids.len();
        let concurrency = self.config.concurrency.clamp(1, MAX_CONCURRENCY);

        tracing::info!(total, concurrency, "deleting package versions");

        let cancel = self.cancel.clone();
        let mut results = stream::iter(ids)
            .take_while(move |_| futures::future::ready(!cancel.is_cancelled()))
            .map(|id| self.delete_one(registry, id))
            .buffer_unordered(concurrency);

        let mut report = DeletionReport::default();
        while let Some(result) = results.next().await {
            report.record(&result);
            on_outcome(&result);
        }

        report.skipped = total - report.attempted();
        report.cancelled = report.skipped > 0;

        if report.cancelled {
            tracing::warn!(
                attempted = report.attempted(),
                skipped = report.skipped,
                "deletion cancelled"
            );
        }
        tracing::info!(
            succeeded = report.succeeded,
            already_gone = report.already_gone,
            failed = report.failed,
            "deletion finished"
        );

        report
    }

    async fn delete_one<R>(&self, registry: &R, id: VersionId) -> DeletionResult
    where
        R: PackageRegistry + ?Sized,
    {
        let start = Instant::now();
        let timeout = self.config.request_timeout;

        let outcome = match tokio::time::timeout(timeout, registry.delete_version(id)).await {
            Ok(Ok(DeleteStatus::Deleted)) => DeletionOutcome::Deleted,
            Ok(Ok(DeleteStatus::NotFound)) => DeletionOutcome::AlreadyGone,
            Ok(Ok(DeleteStatus::Rejected { status, message })) => {
                let message = message.trim();
                if message.is_empty() {
                    DeletionOutcome::Failed(format!("HTTP {status}"))
                } else {
                    DeletionOutcome::Failed(format!("HTTP {status}: {message}"))
                }
            }
            Ok(Err(e)) => DeletionOutcome::Failed(e.to_string()),
            Err(_) => DeletionOutcome::Failed(format!(
                "timed out after {}ms",
                timeout.as_millis()
            )),
        };

        if let DeletionOutcome::Failed(detail) = &outcome {
            tracing::warn!(id = %id, error = %detail, "failed to delete version");
        } else {
            tracing::debug!(id = %id, outcome = ?outcome, "deleted version");
        }

        DeletionResult {
            id,
            outcome,
            duration: start.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use retainer_core::VersionRecord;

    use super::*;
    use crate::mock::InMemoryRegistry;

    fn registry(count: u64) -> InMemoryRegistry {
        InMemoryRegistry::new(
            (1..=count)
                .map(|id| VersionRecord::new(id, Vec::<String>::new(), Utc::now()))
                .collect(),
        )
    }

    fn ids(values: impl IntoIterator<Item = u64>) -> Vec<VersionId> {
        values.into_iter().map(VersionId).collect()
    }

    #[test]
    fn test_concurrency_is_clamped() {
        assert_eq!(ExecutorConfig::default().with_concurrency(0).concurrency, 1);
        assert_eq!(ExecutorConfig::default().with_concurrency(64).concurrency, MAX_CONCURRENCY);
        assert_eq!(ExecutorConfig::default().concurrency, DEFAULT_CONCURRENCY);
    }

    #[tokio::test]
    async fn test_all_deleted() {
        let registry = registry(3);
        let executor = DeletionExecutor::default();

        let report = executor.execute(&registry, ids(1..=3), |_| {}).await;

        assert_eq!(report.succeeded, 3);
        assert!(report.is_clean());
        assert_eq!(report.total(), 3);
    }

    #[tokio::test]
    async fn test_rejected_item_does_not_stop_batch() {
        let registry = registry(3).with_delete_status(
            2,
            DeleteStatus::Rejected {
                status: 500,
                message: "internal".to_string(),
            },
        );
        let executor = DeletionExecutor::default();

        let report = executor.execute(&registry, ids(1..=3), |_| {}).await;

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(
            report.failures,
            vec![DeletionFailure {
                id: VersionId(2),
                detail: "HTTP 500: internal".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_version_is_already_gone() {
        let registry = registry(1);
        let executor = DeletionExecutor::default();

        let report = executor.execute(&registry, ids([1, 99]), |_| {}).await;

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.already_gone, 1);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_transport_error_is_failure() {
        let registry = registry(2).with_delete_error(1);
        let executor = DeletionExecutor::default();

        let report = executor.execute(&registry, ids(1..=2), |_| {}).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].id, VersionId(1));
        assert!(report.failures[0].detail.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_timeout_is_failure() {
        let registry = registry(2).with_delete_delay_for(1, Duration::from_secs(5));
        let executor = DeletionExecutor::new(
            ExecutorConfig::default().with_request_timeout(Duration::from_millis(50)),
        );

        let report = executor.execute(&registry, ids(1..=2), |_| {}).await;

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert!(report.failures[0].detail.contains("timed out"));
    }

    #[tokio::test]
    async fn test_concurrency_bound_respected() {
        let registry = registry(12).with_delete_delay(Duration::from_millis(20));
        let executor = DeletionExecutor::new(ExecutorConfig::default().with_concurrency(3));

        let report = executor.execute(&registry, ids(1..=12), |_| {}).await;

        assert_eq!(report.succeeded, 12);
        assert!(registry.max_in_flight() <= 3);
        assert!(registry.max_in_flight() >= 1);
    }

    #[tokio::test]
    async fn test_cancel_before_start_attempts_nothing() {
        let registry = registry(3);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let executor = DeletionExecutor::default().with_cancellation(cancel);

        let report = executor.execute(&registry, ids(1..=3), |_| {}).await;

        assert!(report.cancelled);
        assert_eq!(report.attempted(), 0);
        assert_eq!(report.skipped, 3);
        assert!(registry.delete_calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_batch_lets_in_flight_finish() {
        let registry = registry(5);
        let executor = DeletionExecutor::new(ExecutorConfig::default().with_concurrency(1));
        let cancel = executor.cancel_flag();

        let report = executor
            .execute(&registry, ids(1..=5), |_| cancel.cancel())
            .await;

        assert!(report.cancelled);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.skipped, 4);
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn test_cancel_after_last_request_is_not_cancelled() {
        let registry = registry(2);
        let executor = DeletionExecutor::new(ExecutorConfig::default().with_concurrency(2));
        let cancel = executor.cancel_flag();
        let mut seen = 0;

        let report = executor
            .execute(&registry, ids(1..=2), |_| {
                seen += 1;
                if seen == 2 {
                    cancel.cancel();
                }
            })
            .await;

        assert!(executor.cancel_flag().is_cancelled());
        assert!(!report.cancelled);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.succeeded, 2);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_callback_sees_every_result() {
        let registry = registry(4);
        let executor = DeletionExecutor::default();
        let mut seen = Vec::new();

        executor
            .execute(&registry, ids(1..=4), |result| seen.push(result.id))
            .await;

        seen.sort();
        assert_eq!(seen, ids(1..=4));
    }
}
