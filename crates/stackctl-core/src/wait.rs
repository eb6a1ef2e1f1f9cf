//! Waiting for long-running operations
//!
//! Mutating API calls return before the resource is ready. [`WaitHandler`]
//! polls a [`StatusClient`] at a fixed interval until the operation reaches
//! a terminal state, the caller cancels, or the optional deadline passes.
//!
//! Exactly one status query is in flight at a time. Cancellation and the
//! deadline are raced against both the query and the sleep between queries,
//! so a hung query never delays either of them.
//!
//! # Example
//!
//! ```rust,ignore
//! use stackctl_core::wait::{OperationHandle, PollingPolicy, WaitHandler};
//! use stackctl_core::skcf::ClusterReadiness;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! let status = ClusterReadiness::new(&client);
//! let handle = OperationHandle::new("my-project", "my-cluster");
//! let policy = PollingPolicy::new(Duration::from_secs(5))
//!     .with_max_elapsed(Duration::from_secs(1800));
//!
//! let cluster = WaitHandler::new(&status, handle, policy)
//!     .wait(&CancellationToken::new())
//!     .await?;
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{BoxError, CoreError, Result};
use crate::progress::{ProgressCallback, ProgressEvent, emit};

/// Default time between status queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default upper bound for a whole wait
pub const DEFAULT_MAX_ELAPSED: Duration = Duration::from_secs(45 * 60);

/// Identifies one long-running operation: a project and a resource name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationHandle {
    project_id: String,
    name: String,
}

impl OperationHandle {
    pub fn new(project_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            name: name.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project_id, self.name)
    }
}

/// Status of an operation as seen by one poll
///
/// Only `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationStatus<T> {
    Pending,
    InProgress,
    Succeeded(T),
    Failed(String),
}

impl<T> OperationStatus<T> {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationStatus::Succeeded(_) | OperationStatus::Failed(_)
        )
    }

    /// Short label for progress output
    pub fn label(&self) -> &'static str {
        match self {
            OperationStatus::Pending => "pending",
            OperationStatus::InProgress => "in progress",
            OperationStatus::Succeeded(_) => "succeeded",
            OperationStatus::Failed(_) => "failed",
        }
    }
}

/// How often to poll and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingPolicy {
    /// Time between the end of one query and the start of the next
    pub interval: Duration,
    /// Overall bound measured from the start of the wait; `None` waits forever
    pub max_elapsed: Option<Duration>,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_elapsed: Some(DEFAULT_MAX_ELAPSED),
        }
    }
}

impl PollingPolicy {
    /// Poll at `interval` with no deadline
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_elapsed: None,
        }
    }

    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = Some(max_elapsed);
        self
    }
}

/// Reads the current status of an operation
///
/// Implementations pair an API query with a classifier that maps the
/// resource into an [`OperationStatus`]. Anything the classifier does not
/// recognise must map to a non-terminal status.
#[async_trait]
pub trait StatusClient: Send + Sync {
    /// Value carried by a successful terminal status
    type Output: Send;

    async fn get_status(
        &self,
        handle: &OperationHandle,
    ) -> std::result::Result<OperationStatus<Self::Output>, BoxError>;
}

/// Polls one operation until it reaches a terminal state
///
/// [`WaitHandler::wait`] consumes the handler, so each handler yields
/// exactly one outcome.
pub struct WaitHandler<'a, S: StatusClient> {
    client: &'a S,
    handle: OperationHandle,
    policy: PollingPolicy,
    on_progress: Option<ProgressCallback>,
}

impl<'a, S: StatusClient> WaitHandler<'a, S> {
    pub fn new(client: &'a S, handle: OperationHandle, policy: PollingPolicy) -> Self {
        Self {
            client,
            handle,
            policy,
            on_progress: None,
        }
    }

    /// Report progress through `callback`
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub(crate) fn with_progress(mut self, callback: Option<ProgressCallback>) -> Self {
        self.on_progress = callback;
        self
    }

    pub fn handle(&self) -> &OperationHandle {
        &self.handle
    }

    /// Poll until the operation succeeds or fails, `cancel` fires, or the
    /// deadline passes
    ///
    /// # Errors
    ///
    /// * [`CoreError::OperationFailed`] when the operation reports failure
    /// * [`CoreError::StatusQueryFailed`] when a status query errors
    /// * [`CoreError::Cancelled`] when `cancel` fires
    /// * [`CoreError::Timeout`] when `max_elapsed` passes first
    pub async fn wait(self, cancel: &CancellationToken) -> Result<S::Output> {
        let start = Instant::now();
        let operation = self.handle.to_string();
        debug!(
            "Waiting for {} (interval {:?}, max {:?})",
            operation, self.policy.interval, self.policy.max_elapsed
        );

        emit(
            &self.on_progress,
            ProgressEvent::Started {
                operation: operation.clone(),
            },
        );

        let outcome = self.poll_until_terminal(cancel, start).await;

        match &outcome {
            Ok(_) => {
                debug!("{} completed after {:?}", operation, start.elapsed());
                emit(
                    &self.on_progress,
                    ProgressEvent::Completed {
                        operation,
                        elapsed: start.elapsed(),
                    },
                );
            }
            Err(e) => {
                debug!("Wait for {} ended: {}", operation, e);
                emit(
                    &self.on_progress,
                    ProgressEvent::Failed {
                        operation,
                        error: e.to_string(),
                    },
                );
            }
        }

        outcome
    }

    async fn poll_until_terminal(
        &self,
        cancel: &CancellationToken,
        start: Instant,
    ) -> Result<S::Output> {
        let deadline = self.policy.max_elapsed.map(|max| start + max);
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(self.timed_out());
            }

            attempt += 1;
            trace!("Querying status of {} (attempt {})", self.handle, attempt);

            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CoreError::Cancelled),
                _ = until(deadline) => return Err(self.timed_out()),
                result = self.client.get_status(&self.handle) => {
                    result.map_err(|source| CoreError::StatusQueryFailed {
                        operation: self.handle.to_string(),
                        source,
                    })?
                }
            };

            let label = status.label();
            match status {
                OperationStatus::Succeeded(value) => return Ok(value),
                OperationStatus::Failed(reason) => {
                    return Err(CoreError::OperationFailed(reason));
                }
                OperationStatus::Pending | OperationStatus::InProgress => {
                    trace!("{} is {}", self.handle, label);
                    emit(
                        &self.on_progress,
                        ProgressEvent::Polling {
                            operation: self.handle.to_string(),
                            status: label.to_string(),
                            attempt,
                            elapsed: start.elapsed(),
                        },
                    );
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CoreError::Cancelled),
                _ = until(deadline) => return Err(self.timed_out()),
                _ = sleep(self.policy.interval) => {}
            }
        }
    }

    fn timed_out(&self) -> CoreError {
        CoreError::Timeout(self.policy.max_elapsed.unwrap_or_default())
    }
}

/// Resolves at `deadline`, or never when there is none
async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
