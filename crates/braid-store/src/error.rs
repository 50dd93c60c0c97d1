//! Error types for log storage

use braid_model::{IdError, LogId, ParseError, Subject};
use std::path::PathBuf;

/// Errors while listing or reading logs
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Subject has no log directory or group index
    #[error("subject not found: {0}")]
    SubjectNotFound(Subject),

    /// Log listed but not present
    #[error("log not found: {subject}/{log}")]
    LogNotFound { subject: Subject, log: LogId },

    /// IO error while reading storage
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Log file is not valid JSONL
    #[error("failed to parse log {log}: {source}")]
    Parse {
        log: LogId,
        #[source]
        source: ParseError,
    },

    /// Group index is not valid JSON
    #[error("invalid group index {path}: {source}")]
    InvalidIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Identifier cannot be used as a storage name
    #[error(transparent)]
    InvalidId(#[from] IdError),

    /// Backend refused the request
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Read did not finish in time
    #[error("timed out reading log {0}")]
    Timeout(LogId),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if error is transient (retry may succeed)
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_) | Self::Io { .. })
    }
}
