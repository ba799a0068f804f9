//! Error types for Retainer core operations.
//!
//! Classification and evaluation are total, so the only fallible operation in
//! this crate is parsing a string into a [`SemVersion`](crate::SemVersion)
//! directly.

use thiserror::Error;

/// Errors produced when a string is not a semantic version.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseVersionError {
    /// The input was empty after trimming the optional `v` prefix.
    #[error("Empty version string")]
    Empty,

    /// A release component was missing or not a decimal number.
    #[error("Invalid release component '{component}' in '{input}'")]
    InvalidComponent {
        /// Full input string.
        input: String,
        /// Offending component.
        component: String,
    },

    /// More than three release components were given.
    #[error("Too many release components in '{input}'")]
    TooManyComponents {
        /// Full input string.
        input: String,
    },

    /// A pre-release identifier was empty or contained invalid characters.
    #[error("Invalid pre-release identifier '{identifier}' in '{input}'")]
    InvalidPrerelease {
        /// Full input string.
        input: String,
        /// Offending identifier.
        identifier: String,
    },
}
