//! Error types for the Larder store.

use thiserror::Error;

/// Convenience `Result` type alias for Larder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the graph backend or preparing
/// data for it.
///
/// Absent lookup results are not errors: finders return `Option`. All
/// backend failures propagate to the caller unretried — this layer performs
/// no recovery of its own.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Backend unreachable, or a request exceeded its timeout.
    #[error("graph backend unavailable: {message}")]
    StoreUnavailable {
        /// Human-readable description of the failure.
        message: String,
        /// Source error if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed traversal, schema mismatch, or an unexpected response
    /// shape from the backend.
    #[error("query error: {message}")]
    Query {
        /// What the backend rejected or returned unexpectedly.
        message: String,
    },

    /// Missing or invalid configuration.
    #[error("configuration error: {message}")]
    Config {
        /// What configuration is problematic.
        message: String,
    },

    /// Caller-supplied data rejected before any backend call.
    #[error("validation error: {message}")]
    Validation {
        /// What was rejected and why.
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns whether this error is worth retrying.
    ///
    /// Only transport-level failures are transient; query, configuration,
    /// and validation errors are permanent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::StoreUnavailable { .. })
    }

    /// Creates a new `StoreUnavailable` error with a message.
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Error::StoreUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `StoreUnavailable` error with a message and source.
    pub fn unavailable_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::StoreUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new `Query` error.
    pub fn query<S: Into<String>>(message: S) -> Self {
        Error::Query {
            message: message.into(),
        }
    }

    /// Creates a new `Config` error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a new `Validation` error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }
}
