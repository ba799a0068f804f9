//! GitHub Packages REST API wire types.

use chrono::{DateTime, Utc};
use retainer_core::{VersionId, VersionRecord};
use serde::Deserialize;

/// GitHub media types and headers.
pub struct MediaType;

impl MediaType {
    /// Recommended `Accept` value for the GitHub REST API.
    pub const GITHUB_JSON: &'static str = "application/vnd.github+json";

    /// REST API version header name.
    pub const API_VERSION_HEADER: &'static str = "X-GitHub-Api-Version";

    /// REST API version pinned by this client.
    pub const API_VERSION: &'static str = "2022-11-28";
}

/// One item of the package versions listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageVersion {
    /// Version identifier.
    pub id: u64,

    /// Version name (the manifest digest for container packages).
    #[serde(default)]
    pub name: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Package-type specific metadata.
    #[serde(default)]
    pub metadata: Option<PackageMetadata>,
}

/// Metadata block of a package version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageMetadata {
    /// Package type reported by the API.
    #[serde(default)]
    pub package_type: Option<String>,

    /// Container-specific metadata.
    #[serde(default)]
    pub container: Option<ContainerMetadata>,
}

/// Container metadata of a package version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerMetadata {
    /// Tags pointing at this version. The API may send `null`.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl PackageVersion {
    /// Returns the container tags, or an empty slice when the API omits them.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        self.metadata
            .as_ref()
            .and_then(|m| m.container.as_ref())
            .and_then(|c| c.tags.as_deref())
            .unwrap_or(&[])
    }
}

impl From<PackageVersion> for VersionRecord {
    fn from(version: PackageVersion) -> Self {
        let tags = version
            .metadata
            .and_then(|m| m.container)
            .and_then(|c| c.tags)
            .unwrap_or_default();

        Self {
            id: VersionId(version.id),
            tags,
            created_at: version.created_at,
        }
    }
}
