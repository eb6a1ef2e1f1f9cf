//! Progress events for long-running operations
//!
//! The wait handler reports each transition through an optional callback.
//! The CLI uses it to drive a spinner; other callers usually pass nothing.

use std::time::Duration;

/// Progress events emitted while waiting for an operation
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Waiting has started
    Started { operation: String },
    /// A status query returned a non-terminal status
    Polling {
        operation: String,
        status: String,
        attempt: u32,
        elapsed: Duration,
    },
    /// The operation reached its success state
    Completed { operation: String, elapsed: Duration },
    /// The wait ended without success (failure, cancellation, timeout, query error)
    Failed { operation: String, error: String },
}

/// Callback type for progress updates
///
/// CLI can use this to update spinners/progress bars.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Helper to emit progress events
pub(crate) fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}
