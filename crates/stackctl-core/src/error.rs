//! Unified error handling for stackctl-core
//!
//! Keeps "we gave up" ([`CoreError::Cancelled`], [`CoreError::Timeout`])
//! apart from "the operation failed" ([`CoreError::OperationFailed`]).
//!
//! # Example
//!
//! ```rust
//! use stackctl_core::{CoreError, parse_duration};
//!
//! let err = parse_duration("10w").unwrap_err();
//! assert!(matches!(err, CoreError::InvalidDuration(_)));
//! assert!(!err.is_retryable());
//! ```

use std::time::Duration;
use thiserror::Error;

use crate::api::ApiError;

/// Boxed error returned by status collaborators
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed or unrecognized duration string
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// The status collaborator failed while waiting for an operation
    #[error("Failed to query status of {operation}: {source}")]
    StatusQueryFailed {
        operation: String,
        #[source]
        source: BoxError,
    },

    /// The remote operation reached a failure state
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// The submit response did not say which operation it started
    #[error("Response of {0} carries no operation name")]
    MissingOperationName(String),

    /// The wait was cancelled by the caller
    #[error("Operation wait cancelled")]
    Cancelled,

    /// The configured deadline passed before the operation finished
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// The user declined the confirmation prompt
    #[error("Operation aborted")]
    Aborted,

    /// The confirmation prompt could not be shown or read
    #[error("Failed to read confirmation: {0}")]
    Prompt(String),

    /// Validation error (e.g. resource already exists)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error from the management API
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local file system failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if the wait was cancelled by the caller
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Cancelled)
    }

    /// Returns true if this is a timeout error
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::Api(e) => e.is_timeout(),
            CoreError::Timeout(_) => true,
            _ => false,
        }
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            CoreError::Api(e) => e.is_not_found(),
            CoreError::StatusQueryFailed { source, .. } => source
                .downcast_ref::<ApiError>()
                .is_some_and(ApiError::is_not_found),
            _ => false,
        }
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            CoreError::Api(e) => e.is_unauthorized(),
            CoreError::StatusQueryFailed { source, .. } => source
                .downcast_ref::<ApiError>()
                .is_some_and(ApiError::is_unauthorized),
            _ => false,
        }
    }

    /// Returns true if this is a bad request error (400)
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        match self {
            CoreError::Api(e) => e.is_bad_request(),
            CoreError::InvalidDuration(_) | CoreError::Validation(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error is potentially retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Api(e) => e.is_retryable(),
            CoreError::Timeout(_) => true, // the operation may still finish
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_from_api() {
        let api_err = ApiError::NotFound {
            message: "cluster not found".to_string(),
        };
        let core_err: CoreError = api_err.into();

        assert!(core_err.is_not_found());
        assert!(!core_err.is_unauthorized());
        assert!(!core_err.is_retryable());
    }

    #[test]
    fn test_status_query_failed_inspects_source() {
        let err = CoreError::StatusQueryFailed {
            operation: "p/c".to_string(),
            source: Box::new(ApiError::Unauthorized {
                message: "token expired".to_string(),
            }),
        };
        assert!(err.is_unauthorized());
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("p/c"));
    }

    #[test]
    fn test_gave_up_is_distinct_from_failed() {
        let cancelled = CoreError::Cancelled;
        let timeout = CoreError::Timeout(Duration::from_secs(60));
        let failed = CoreError::OperationFailed("quota exceeded".to_string());

        assert!(cancelled.is_cancelled());
        assert!(!cancelled.is_timeout());
        assert!(timeout.is_timeout());
        assert!(timeout.is_retryable());
        assert!(!failed.is_timeout());
        assert!(!failed.is_cancelled());
        assert!(failed.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_invalid_duration_is_bad_request() {
        let err = CoreError::InvalidDuration("invalid time unit: 'x'".to_string());
        assert!(err.is_bad_request());
        assert!(!err.is_retryable());
    }
}
