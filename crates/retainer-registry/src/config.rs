//! Configuration types for the registry client.

use std::fmt;
use std::time::Duration;

use retainer_core::VersionId;
use url::Url;

use crate::error::RegistryError;

/// Default GitHub REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default package type for container images.
pub const DEFAULT_PACKAGE_TYPE: &str = "container";

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// REST API base URL (e.g., "<https://api.github.com>").
    pub api_url: String,

    /// Organization or user that owns the package.
    pub owner: String,

    /// Whether `owner` is an organization or a user account.
    pub owner_kind: OwnerKind,

    /// Package name.
    pub package: String,

    /// Package type (`container` for GHCR images).
    pub package_type: String,

    /// Authentication configuration.
    pub auth: RegistryAuth,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl RegistryConfig {
    /// Creates a configuration for an organization-owned container package.
    ///
    /// # Examples
    ///
    /// ```
    /// use retainer_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("acme", "vllm-custom");
    /// assert_eq!(config.api_url, "https://api.github.com");
    /// assert_eq!(config.package_type, "container");
    /// ```
    #[must_use]
    pub fn new(owner: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            owner: owner.into(),
            owner_kind: OwnerKind::Organization,
            package: package.into(),
            package_type: DEFAULT_PACKAGE_TYPE.to_string(),
            auth: RegistryAuth::None,
            timeout: Duration::from_secs(30),
            user_agent: format!("retainer/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Sets the owner kind.
    #[must_use]
    pub const fn with_owner_kind(mut self, kind: OwnerKind) -> Self {
        self.owner_kind = kind;
        self
    }

    /// Sets the package type.
    #[must_use]
    pub fn with_package_type(mut self, package_type: impl Into<String>) -> Self {
        self.package_type = package_type.into();
        self
    }

    /// Sets the authentication method.
    #[must_use]
    pub fn with_auth(mut self, auth: RegistryAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks that the configuration can address a package.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner or package is empty, or the API URL is
    /// not an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.owner.trim().is_empty() {
            return Err(RegistryError::InvalidConfig {
                message: "owner must not be empty".to_string(),
            });
        }
        if self.package.trim().is_empty() {
            return Err(RegistryError::InvalidConfig {
                message: "package must not be empty".to_string(),
            });
        }
        self.base_url().map(|_| ())
    }

    /// Returns the URL listing all versions of the package.
    ///
    /// # Examples
    ///
    /// ```
    /// use retainer_registry::{OwnerKind, RegistryConfig};
    ///
    /// let config = RegistryConfig::new("acme", "vllm-custom");
    /// assert_eq!(
    ///     config.versions_url().unwrap().as_str(),
    ///     "https://api.github.com/orgs/acme/packages/container/vllm-custom/versions"
    /// );
    ///
    /// let user = config.with_owner_kind(OwnerKind::User);
    /// assert!(user.versions_url().unwrap().path().starts_with("/users/acme/"));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is invalid.
    pub fn versions_url(&self) -> Result<Url, RegistryError> {
        self.package_url(&[])
    }

    /// Returns the URL of a single package version.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is invalid.
    pub fn version_url(&self, id: VersionId) -> Result<Url, RegistryError> {
        self.package_url(&[&id.to_string()])
    }

    fn package_url(&self, extra: &[&str]) -> Result<Url, RegistryError> {
        let mut url = self.base_url()?;
        url.path_segments_mut()
            .map_err(|()| RegistryError::InvalidUrl {
                url: self.api_url.clone(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend([
                self.owner_kind.path_segment(),
                self.owner.as_str(),
                "packages",
                self.package_type.as_str(),
                self.package.as_str(),
                "versions",
            ])
            .extend(extra);
        Ok(url)
    }

    fn base_url(&self) -> Result<Url, RegistryError> {
        let url = Url::parse(&self.api_url).map_err(|e| RegistryError::InvalidUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(RegistryError::InvalidUrl {
                url: self.api_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(url)
    }
}

/// Kind of account that owns a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerKind {
    /// An organization (`/orgs/{owner}`).
    #[default]
    Organization,

    /// A user account (`/users/{owner}`).
    User,
}

impl OwnerKind {
    /// Returns the REST path segment for this owner kind.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Organization => "orgs",
            Self::User => "users",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organization => write!(f, "organization"),
            Self::User => write!(f, "user"),
        }
    }
}

/// Authentication methods for registry access.
#[derive(Clone)]
pub enum RegistryAuth {
    /// No authentication (public metadata only; deletions will be rejected).
    None,

    /// Bearer token authentication (`GITHUB_TOKEN` or a personal access token).
    Bearer {
        /// Token value.
        token: String,
    },
}

impl RegistryAuth {
    /// Creates bearer token authentication.
    ///
    /// # Examples
    ///
    /// ```
    /// use retainer_registry::RegistryAuth;
    ///
    /// let auth = RegistryAuth::bearer("ghp_example");
    /// assert!(auth.is_authenticated());
    /// ```
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Returns true if a credential is configured.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Bearer { .. })
    }
}

impl fmt::Debug for RegistryAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bearer { .. } => f.debug_struct("Bearer").field("token", &"***").finish(),
        }
    }
}
