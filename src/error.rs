//! Crate-level error type
//!
//! Each module owns its error enum; [`Error`] wraps them so callers that
//! drive the whole pipeline can use a single `?` chain.

use thiserror::Error;

use crate::config::{ConfigError, ValidationError};
use crate::data::DatasetLoadError;
use crate::fold::FoldError;
use crate::metrics::MetricError;
use crate::tracking::storage::TrackingStorageError;
use crate::tracking::TrackingError;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing a cross-validated run
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Fold(#[from] FoldError),

    #[error(transparent)]
    Dataset(#[from] DatasetLoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Tracking(#[from] TrackingError),

    #[error(transparent)]
    Metric(#[from] MetricError),

    /// IO error with context
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl Error {
    /// Wrap an I/O error with a description of what was being done
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

impl From<TrackingStorageError> for Error {
    fn from(err: TrackingStorageError) -> Self {
        Self::Tracking(TrackingError::Storage(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_error_transparent() {
        let err: Error = FoldError::InvalidFoldCount { k: 10, n: 5 }.into();
        assert_eq!(
            err.to_string(),
            FoldError::InvalidFoldCount { k: 10, n: 5 }.to_string()
        );
    }

    #[test]
    fn test_validation_error_prefixed() {
        let err: Error = ValidationError::MissingTrainPath.into();
        assert!(err.to_string().starts_with("Configuration validation failed"));
    }

    #[test]
    fn test_io_error_has_context() {
        let err = Error::io(
            "writing folds.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("writing folds.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_storage_error_lifts_into_tracking() {
        let err: Error = TrackingStorageError::RunNotFound("run-1".into()).into();
        assert!(matches!(err, Error::Tracking(TrackingError::Storage(_))));
    }
}
