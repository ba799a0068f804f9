//! Error types for registry operations.

use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to connect to the registry API.
    #[error("Failed to connect to registry at {url}: {source}")]
    ConnectionFailed {
        /// API URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The credential was missing or rejected.
    #[error("Authentication failed ({status}): {message}")]
    AuthenticationFailed {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Non-success HTTP status from the registry API.
    #[error("HTTP error from registry: {status} - {message}")]
    HttpError {
        /// HTTP status code (0 when no response was received).
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The request did not complete in time.
    #[error("Request to {url} timed out")]
    Timeout {
        /// Request URL.
        url: String,
    },

    /// JSON deserialization error.
    #[error("JSON error: {source}")]
    JsonError {
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// URL string.
        url: String,
        /// Why it is invalid.
        reason: String,
    },

    /// Invalid client configuration.
    #[error("Invalid registry configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    /// The registry kept returning full pages past the safety limit.
    #[error("Pagination did not terminate after {pages} pages")]
    PaginationLimit {
        /// Pages requested.
        pages: u32,
    },
}

impl RegistryError {
    /// Returns the HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailed { status, .. } | Self::HttpError { status, .. }
                if *status != 0 =>
            {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);

        if err.is_timeout() {
            Self::Timeout { url }
        } else if err.is_connect() {
            Self::ConnectionFailed { url, source: err }
        } else if err.is_status() {
            let status = err.status().map_or(0, |s| s.as_u16());
            Self::HttpError {
                status,
                message: err.to_string(),
            }
        } else {
            Self::HttpError {
                status: 0,
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError { source: err }
    }
}
