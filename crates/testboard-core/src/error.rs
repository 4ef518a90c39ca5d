//! Error types for leaderboard generation.

use std::fmt;
use std::path::PathBuf;

/// Identifies the record a validation error refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLocator {
    /// Zero-based row in the incoming record collection.
    Row(usize),
    /// A per-job rollup.
    Job(String),
}

impl fmt::Display for RecordLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row(idx) => write!(f, "row {}", idx),
            Self::Job(job) => write!(f, "job '{}'", job),
        }
    }
}

/// Errors raised while loading, aggregating or caching records.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// A record carries a missing, non-numeric or inconsistent field.
    #[error("malformed input: {locator} field '{field}': {reason}")]
    MalformedInput {
        locator: RecordLocator,
        field: String,
        reason: String,
    },

    /// A required column is absent from a query response.
    #[error("malformed input: missing column '{field}' (header: {header:?})")]
    MissingColumn { field: String, header: Vec<String> },

    /// A source returned something that is not a columnar query response.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// The source has no data for the named query.
    #[error("query not found: {query} (looked in {path})")]
    QueryNotFound { query: String, path: PathBuf },

    /// Cache error.
    #[error("cache error: {message}")]
    Cache { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Filesystem error outside the cache.
    #[error("io error: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BoardError {
    pub fn malformed(
        locator: RecordLocator,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedInput {
            locator,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Input / config issues
            Self::MalformedInput { .. } => 2,
            Self::MissingColumn { .. } => 2,
            Self::InvalidResponse { .. } => 2,
            Self::QueryNotFound { .. } => 2,
            Self::Config { .. } => 2,

            // Environment
            Self::Cache { .. } => 3,
            Self::Io { .. } => 3,
        }
    }

    /// Whether the error describes bad record data rather than a broken environment.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput { .. }
                | Self::MissingColumn { .. }
                | Self::InvalidResponse { .. }
        )
    }
}

/// Result type for leaderboard operations.
pub type BoardResult<T> = Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_record_and_field() {
        let err = BoardError::malformed(RecordLocator::Row(3), "failures", "expected a number");
        assert_eq!(
            err.to_string(),
            "malformed input: row 3 field 'failures': expected a number"
        );
        assert!(err.is_malformed_input());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_job_locator_display() {
        let err = BoardError::malformed(RecordLocator::Job("build-linux".into()), "count", "overflow");
        assert!(err.to_string().contains("job 'build-linux'"));
    }

    #[test]
    fn test_cache_error_is_environmental() {
        let err = BoardError::Cache {
            message: "failed to write temp file".into(),
        };
        assert!(!err.is_malformed_input());
        assert_eq!(err.exit_code(), 3);
    }
}
