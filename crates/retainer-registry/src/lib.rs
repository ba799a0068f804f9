//! # Retainer Registry
//!
//! GitHub Packages client and deletion machinery for Retainer.
//!
//! This crate fetches the version catalog of a container package hosted on
//! GHCR and deletes the versions a retention plan marks as deletable.
//!
//! ## Features
//!
//! - **Registry seam**: [`PackageRegistry`] abstracts listing and deleting
//! - **GitHub client**: [`GithubPackagesClient`] over the Packages REST API
//! - **Paginated fetch**: [`fetch_catalog`] builds one deduplicated catalog
//! - **Bounded deletion**: [`DeletionExecutor`] with timeouts and cancellation
//! - **Offline registry**: [`mock::InMemoryRegistry`] for tests and demos
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use retainer_core::RetentionPolicy;
//! use retainer_registry::{
//!     fetch_catalog, DeletionExecutor, ExecutorConfig, GithubPackagesClient, RegistryAuth,
//!     RegistryConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RegistryConfig::new("acme", "vllm-custom")
//!         .with_auth(RegistryAuth::bearer("ghp_example"));
//!     let client = GithubPackagesClient::new(config)?;
//!
//!     let catalog = fetch_catalog(&client, 100).await?;
//!     let plan = RetentionPolicy::new(10).evaluate(&catalog);
//!
//!     let executor = DeletionExecutor::new(ExecutorConfig::default());
//!     let report = executor
//!         .execute(&client, plan.delete_ids.iter().copied(), |_| {})
//!         .await;
//!     println!("deleted {}", report.succeeded);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │   fetch_catalog                     DeletionExecutor        │
//! │  (sequential pages)          (buffer_unordered + timeout)   │
//! └─────────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PackageRegistry                          │
//! │  ┌────────────────────────┐  ┌───────────────────────────┐  │
//! │  │  GithubPackagesClient  │  │     InMemoryRegistry      │  │
//! │  │       (reqwest)        │  │     (tests, offline)      │  │
//! │  └────────────────────────┘  └───────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod api;
mod client;
mod config;
mod error;
mod executor;
mod fetch;
pub mod mock;
mod registry;

pub use api::{ContainerMetadata, MediaType, PackageMetadata, PackageVersion};
pub use client::GithubPackagesClient;
pub use config::{OwnerKind, RegistryAuth, RegistryConfig, DEFAULT_API_URL, DEFAULT_PACKAGE_TYPE};
pub use error::RegistryError;
pub use executor::{
    CancelFlag, DeletionExecutor, DeletionFailure, DeletionOutcome, DeletionReport,
    DeletionResult, ExecutorConfig, DEFAULT_CONCURRENCY, MAX_CONCURRENCY,
};
pub use fetch::{fetch_catalog, MAX_PAGES, MAX_PAGE_SIZE};
pub use registry::{DeleteStatus, PackageRegistry};
