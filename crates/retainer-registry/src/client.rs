//! GitHub Packages REST API client.
//!
//! This module provides the HTTP implementation of [`PackageRegistry`] for
//! container packages hosted on GHCR.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use retainer_core::{VersionId, VersionRecord};

use crate::api::{MediaType, PackageVersion};
use crate::config::{RegistryAuth, RegistryConfig};
use crate::error::RegistryError;
use crate::registry::{DeleteStatus, PackageRegistry};

/// Client for the GitHub Packages versions API.
#[derive(Debug)]
pub struct GithubPackagesClient {
    config: RegistryConfig,
    http: reqwest::Client,
}

impl GithubPackagesClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use retainer_registry::{GithubPackagesClient, RegistryAuth, RegistryConfig};
    ///
    /// let config = RegistryConfig::new("acme", "vllm-custom")
    ///     .with_auth(RegistryAuth::bearer("ghp_example"));
    /// let client = GithubPackagesClient::new(config)?;
    /// # Ok::<(), retainer_registry::RegistryError>(())
    /// ```
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        config.validate()?;
        let http = Self::build_http_client(&config)?;

        Ok(Self { config, http })
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Builds the HTTP client with proper configuration.
    fn build_http_client(config: &RegistryConfig) -> Result<reqwest::Client, RegistryError> {
        reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| RegistryError::ConnectionFailed {
                url: config.api_url.clone(),
                source: e,
            })
    }

    /// Creates the headers sent with every request.
    fn request_headers(&self) -> Result<HeaderMap, RegistryError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(MediaType::GITHUB_JSON));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(MediaType::API_VERSION),
        );

        match &self.config.auth {
            RegistryAuth::None => {}
            RegistryAuth::Bearer { token } => {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    RegistryError::AuthenticationFailed {
                        status: 0,
                        message: "Invalid token".to_string(),
                    }
                })?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }

        Ok(headers)
    }
}

#[async_trait]
impl PackageRegistry for GithubPackagesClient {
    async fn list_versions(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<VersionRecord>, RegistryError> {
        let url = self.config.versions_url()?;

        let response = self
            .http
            .get(url)
            .headers(self.request_headers()?)
            .query(&[("per_page", per_page), ("page", page)])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().await.unwrap_or_default();
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                return Err(RegistryError::AuthenticationFailed {
                    status: status.as_u16(),
                    message,
                });
            }
            return Err(RegistryError::HttpError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let versions: Vec<PackageVersion> = serde_json::from_str(&body)?;

        tracing::debug!(
            package = %self.config.package,
            page,
            count = versions.len(),
            "listed package versions"
        );

        Ok(versions.into_iter().map(VersionRecord::from).collect())
    }

    async fn delete_version(&self, id: VersionId) -> Result<DeleteStatus, RegistryError> {
        let url = self.config.version_url(id)?;

        let response = self
            .http
            .delete(url)
            .headers(self.request_headers()?)
            .send()
            .await?;

        let status = response.status();
        let outcome = match status {
            StatusCode::NO_CONTENT => DeleteStatus::Deleted,
            StatusCode::NOT_FOUND => DeleteStatus::NotFound,
            _ => DeleteStatus::Rejected {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            },
        };

        tracing::debug!(id = %id, status = status.as_u16(), "delete request completed");

        Ok(outcome)
    }
}
