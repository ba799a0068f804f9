//! In-memory registry for tests and offline runs.
//!
//! [`InMemoryRegistry`] serves a fixed list of versions page by page and
//! records every call, so fetch and deletion behavior can be exercised
//! without a network.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use retainer_core::{VersionId, VersionRecord};

use crate::error::RegistryError;
use crate::registry::{DeleteStatus, PackageRegistry};

/// A deterministic, in-memory [`PackageRegistry`].
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    versions: Vec<VersionRecord>,
    list_failure: Option<(u32, u16)>,
    delete_overrides: HashMap<VersionId, DeleteStatus>,
    delete_errors: HashSet<VersionId>,
    delete_delays: HashMap<VersionId, Duration>,
    default_delay: Option<Duration>,
    deleted: Mutex<Vec<VersionId>>,
    list_calls: Mutex<Vec<(u32, u32)>>,
    delete_calls: Mutex<Vec<VersionId>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl InMemoryRegistry {
    /// Creates a registry serving the given versions in order.
    #[must_use]
    pub fn new(versions: Vec<VersionRecord>) -> Self {
        Self {
            versions,
            ..Self::default()
        }
    }

    /// Makes the given page fail with an HTTP status.
    #[must_use]
    pub const fn with_list_failure(mut self, page: u32, status: u16) -> Self {
        self.list_failure = Some((page, status));
        self
    }

    /// Forces the response for deleting `id`.
    #[must_use]
    pub fn with_delete_status(mut self, id: impl Into<VersionId>, status: DeleteStatus) -> Self {
        self.delete_overrides.insert(id.into(), status);
        self
    }

    /// Makes deleting `id` fail without a response.
    #[must_use]
    pub fn with_delete_error(mut self, id: impl Into<VersionId>) -> Self {
        self.delete_errors.insert(id.into());
        self
    }

    /// Delays the response for deleting `id`.
    #[must_use]
    pub fn with_delete_delay_for(mut self, id: impl Into<VersionId>, delay: Duration) -> Self {
        self.delete_delays.insert(id.into(), delay);
        self
    }

    /// Delays every delete response.
    #[must_use]
    pub const fn with_delete_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    /// Returns the ids deleted so far, in completion order.
    #[must_use]
    pub fn deleted(&self) -> Vec<VersionId> {
        self.deleted.lock().clone()
    }

    /// Returns every `(page, per_page)` listing request.
    #[must_use]
    pub fn list_calls(&self) -> Vec<(u32, u32)> {
        self.list_calls.lock().clone()
    }

    /// Returns every id a delete was requested for, in request order.
    #[must_use]
    pub fn delete_calls(&self) -> Vec<VersionId> {
        self.delete_calls.lock().clone()
    }

    /// Returns the highest number of concurrent delete requests observed.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn resolve_delete(&self, id: VersionId) -> Result<DeleteStatus, RegistryError> {
        if self.delete_errors.contains(&id) {
            return Err(RegistryError::HttpError {
                status: 0,
                message: "connection reset by peer".to_string(),
            });
        }

        if let Some(status) = self.delete_overrides.get(&id) {
            return Ok(status.clone());
        }

        let mut deleted = self.deleted.lock();
        if deleted.contains(&id) || !self.versions.iter().any(|v| v.id == id) {
            return Ok(DeleteStatus::NotFound);
        }
        deleted.push(id);
        Ok(DeleteStatus::Deleted)
    }
}

#[async_trait]
impl PackageRegistry for InMemoryRegistry {
    async fn list_versions(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<VersionRecord>, RegistryError> {
        self.list_calls.lock().push((page, per_page));

        if let Some((failing_page, status)) = self.list_failure {
            if failing_page == page {
                return Err(RegistryError::HttpError {
                    status,
                    message: "simulated listing failure".to_string(),
                });
            }
        }

        let per_page = per_page as usize;
        let start = (page.saturating_sub(1) as usize).saturating_mul(per_page);

        Ok(self
            .versions
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect())
    }

    async fn delete_version(&self, id: VersionId) -> Result<DeleteStatus, RegistryError> {
        self.delete_calls.lock().push(id);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = self.delete_delays.get(&id).copied().or(self.default_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = self.resolve_delete(id);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
