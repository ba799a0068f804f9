//! # Retainer Core
//!
//! Core types and the retention-decision algorithm for Retainer.
//!
//! This crate is pure: it never performs I/O. It provides:
//!
//! - [`SemVersion`] - Semantic version with standard precedence
//! - [`TagClassifier`] / [`TagClass`] - Total classification of tag strings
//! - [`Catalog`] / [`VersionRecord`] - Immutable snapshot of published versions
//! - [`RetentionPolicy`] / [`RetentionPlan`] - Keep-window selection and the
//!   mapping from tags back to deletable version ids
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use retainer_core::{Catalog, RetentionPolicy, VersionRecord};
//!
//! let now = Utc::now();
//! let catalog = Catalog::from_records(vec![
//!     VersionRecord::new(101, ["1.0.0"], now),
//!     VersionRecord::new(102, ["1.1.0", "1.1.0-avx2"], now),
//!     VersionRecord::new(103, ["latest"], now),
//!     VersionRecord::new(104, Vec::<String>::new(), now),
//! ]);
//!
//! let plan = RetentionPolicy::new(1).evaluate(&catalog);
//! assert_eq!(plan.delete_ids.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod retention;
pub mod tag;
pub mod version;


pub use catalog::{Catalog, VersionId, VersionRecord};
pub use error::ParseVersionError;
pub use retention::{
    Justification, KeptVersion, PlanSummary, PreserveReason, RetentionDecision, RetentionPlan,
    RetentionPolicy, DEFAULT_KEEP,
};
pub use tag::{TagClass, TagClassifier};
pub use version::SemVersion;
