//! The seam between the retention flow and a concrete registry API.

use async_trait::async_trait;
use retainer_core::{VersionId, VersionRecord};

use crate::error::RegistryError;

/// Outcome of a single delete request that received a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStatus {
    /// The version was deleted (`204 No Content`).
    Deleted,

    /// The version no longer exists (`404 Not Found`).
    NotFound,

    /// Any other response.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },
}

/// A registry that can list and delete package versions.
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Lists one page of versions. Pages are 1-based.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be retrieved in full.
    async fn list_versions(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<VersionRecord>, RegistryError>;

    /// Deletes one version.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received; HTTP failures
    /// are reported through [`DeleteStatus`].
    async fn delete_version(&self, id: VersionId) -> Result<DeleteStatus, RegistryError>;
}
