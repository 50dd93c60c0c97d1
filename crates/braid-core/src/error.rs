//! Error types for the timeline service
//!
//! Covers:
//! - Requests rejected before any work (missing or unusable subject)
//! - Variant lookups against a timeline that is not cached
//! - Storage failures that prevent a build
//! - Configuration loading

use braid_model::IdError;
use braid_store::StoreError;
use std::path::PathBuf;
use std::sync::Arc;

/// Timeline service error
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Request named no subject
    #[error("missing subject")]
    MissingSubject,

    /// Subject id is not usable
    #[error("invalid subject: {0}")]
    InvalidSubject(#[from] IdError),

    /// Variants requested before the timeline was built, or after it expired
    #[error("timeline for {subject} has not been built")]
    NotBuilt {
        /// Requested subject
        subject: String,
    },

    /// Logs could not be listed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Failure of a build shared with other concurrent requests
    #[error(transparent)]
    Shared(Arc<ServiceError>),
}

impl ServiceError {
    /// Check if the caller sent a bad request
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Shared(inner) => inner.is_client_error(),
            other => matches!(other, Self::MissingSubject | Self::InvalidSubject(_)),
        }
    }

    /// Check if the requested thing does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Shared(inner) => inner.is_not_found(),
            other => matches!(
                other,
                Self::NotBuilt { .. } | Self::Store(StoreError::SubjectNotFound(_))
            ),
        }
    }
}

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Config path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Invalid TOML or unknown key
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}
