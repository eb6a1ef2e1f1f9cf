//! Confirm, submit, and optionally wait
//!
//! Every mutating command follows the same shape:
//!
//! 1. ask for confirmation unless the caller pre-authorized the action
//! 2. submit the mutating request
//! 3. in synchronous mode, wait for the operation named in the response
//!
//! Input validation is the caller's job and happens before [`CommandPipeline::run`].

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::progress::ProgressCallback;
use crate::wait::{OperationHandle, PollingPolicy, StatusClient, WaitHandler};

/// Asks the user to approve an action
pub trait Confirmer {
    /// Returns `Ok(true)` when the user approved
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Response of a mutating request that names the started operation
pub trait Submitted {
    fn operation_name(&self) -> Option<&str>;
}

impl Submitted for String {
    fn operation_name(&self) -> Option<&str> {
        Some(self)
    }
}

/// Result of a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome<R, T> {
    /// Submitted in asynchronous mode; nobody waited
    Triggered(R),
    /// Submitted and waited until the operation succeeded
    Completed { submitted: R, result: T },
}

impl<R, T> PipelineOutcome<R, T> {
    pub fn is_triggered(&self) -> bool {
        matches!(self, PipelineOutcome::Triggered(_))
    }

    /// The response of the mutating request
    pub fn submitted(&self) -> &R {
        match self {
            PipelineOutcome::Triggered(submitted) => submitted,
            PipelineOutcome::Completed { submitted, .. } => submitted,
        }
    }
}

/// Orchestrates confirmation, submission and waiting for one command
pub struct CommandPipeline<'a, S: StatusClient> {
    status_client: &'a S,
    project_id: String,
    policy: PollingPolicy,
    cancel: CancellationToken,
    assume_yes: bool,
    asynchronous: bool,
    on_progress: Option<ProgressCallback>,
}

impl<'a, S: StatusClient> CommandPipeline<'a, S> {
    pub fn new(
        status_client: &'a S,
        project_id: impl Into<String>,
        policy: PollingPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            status_client,
            project_id: project_id.into(),
            policy,
            cancel,
            assume_yes: false,
            asynchronous: false,
            on_progress: None,
        }
    }

    /// Skip the confirmation prompt
    pub fn assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    /// Return right after submission instead of waiting
    pub fn asynchronous(mut self, asynchronous: bool) -> Self {
        self.asynchronous = asynchronous;
        self
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Run the pipeline
    ///
    /// `submit` is only called after the confirmation succeeded. A declined
    /// prompt returns [`CoreError::Aborted`].
    pub async fn run<R, F, Fut>(
        self,
        confirmer: &dyn Confirmer,
        prompt: &str,
        submit: F,
    ) -> Result<PipelineOutcome<R, S::Output>>
    where
        R: Submitted,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        if !self.assume_yes && !confirmer.confirm(prompt)? {
            info!("Confirmation declined");
            return Err(CoreError::Aborted);
        }

        let submitted = submit().await?;

        if self.asynchronous {
            debug!("Asynchronous mode, not waiting");
            return Ok(PipelineOutcome::Triggered(submitted));
        }

        let name = submitted
            .operation_name()
            .ok_or_else(|| CoreError::MissingOperationName(self.project_id.clone()))?;
        let handle = OperationHandle::new(self.project_id, name);

        let result = WaitHandler::new(self.status_client, handle, self.policy)
            .with_progress(self.on_progress)
            .wait(&self.cancel)
            .await?;

        Ok(PipelineOutcome::Completed { submitted, result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::wait::OperationStatus;
    use async_trait::async_trait;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct FixedConfirmer {
        answer: bool,
        asked: Cell<u32>,
    }

    impl FixedConfirmer {
        fn new(answer: bool) -> Self {
            Self {
                answer,
                asked: Cell::new(0),
            }
        }
    }

    impl Confirmer for FixedConfirmer {
        fn confirm(&self, _prompt: &str) -> Result<bool> {
            self.asked.set(self.asked.get() + 1);
            Ok(self.answer)
        }
    }

    struct ReadyAfter {
        remaining: AtomicU32,
        calls: AtomicU32,
    }

    impl ReadyAfter {
        fn new(polls: u32) -> Self {
            Self {
                remaining: AtomicU32::new(polls),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl StatusClient for ReadyAfter {
        type Output = String;

        async fn get_status(
            &self,
            handle: &OperationHandle,
        ) -> std::result::Result<OperationStatus<String>, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.remaining.fetch_sub(1, Ordering::SeqCst) <= 1 {
                Ok(OperationStatus::Succeeded(handle.to_string()))
            } else {
                Ok(OperationStatus::InProgress)
            }
        }
    }

    #[derive(Debug)]
    struct Unnamed;

    impl Submitted for Unnamed {
        fn operation_name(&self) -> Option<&str> {
            None
        }
    }

    fn policy() -> PollingPolicy {
        PollingPolicy::new(Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_declined_confirmation_never_submits() {
        let status = ReadyAfter::new(1);
        let confirmer = FixedConfirmer::new(false);
        let submitted = Cell::new(false);

        let err = CommandPipeline::new(&status, "p", policy(), CancellationToken::new())
            .run(&confirmer, "Create?", || async {
                submitted.set(true);
                Ok::<_, CoreError>("c1".to_string())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Aborted));
        assert!(!submitted.get());
        assert_eq!(status.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_assume_yes_skips_prompt_and_waits() {
        let status = ReadyAfter::new(3);
        let confirmer = FixedConfirmer::new(false);

        let outcome = CommandPipeline::new(&status, "p", policy(), CancellationToken::new())
            .assume_yes(true)
            .run(&confirmer, "Create?", || async { Ok::<_, CoreError>("c1".to_string()) })
            .await
            .unwrap();

        assert_eq!(confirmer.asked.get(), 0);
        assert_eq!(
            outcome,
            PipelineOutcome::Completed {
                submitted: "c1".to_string(),
                result: "p/c1".to_string(),
            }
        );
        assert_eq!(status.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_mode_does_not_poll() {
        let status = ReadyAfter::new(1);
        let confirmer = FixedConfirmer::new(true);

        let outcome = CommandPipeline::new(&status, "p", policy(), CancellationToken::new())
            .asynchronous(true)
            .run(&confirmer, "Create?", || async { Ok::<_, CoreError>("c1".to_string()) })
            .await
            .unwrap();

        assert_eq!(confirmer.asked.get(), 1);
        assert!(outcome.is_triggered());
        assert_eq!(outcome.submitted(), "c1");
        assert_eq!(status.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_error_propagates() {
        let status = ReadyAfter::new(1);
        let confirmer = FixedConfirmer::new(true);

        let err = CommandPipeline::new(&status, "p", policy(), CancellationToken::new())
            .run(&confirmer, "Create?", || async {
                Err::<String, _>(CoreError::Validation("cluster exists".to_string()))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(status.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_wait_surfaces_cancelled() {
        let status = ReadyAfter::new(u32::MAX);
        let confirmer = FixedConfirmer::new(true);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            trigger.cancel();
        });

        let err = CommandPipeline::new(&status, "p", policy(), cancel)
            .run(&confirmer, "Create?", || async { Ok::<_, CoreError>("c1".to_string()) })
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_without_name_is_not_an_operation_failure() {
        let status = ReadyAfter::new(1);
        let confirmer = FixedConfirmer::new(true);

        let err = CommandPipeline::new(&status, "p", policy(), CancellationToken::new())
            .assume_yes(true)
            .run(&confirmer, "Create?", || async { Ok::<_, CoreError>(Unnamed) })
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::MissingOperationName(ref project) if project == "p"));
        assert!(!matches!(err, CoreError::OperationFailed(_)));
        assert_eq!(status.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_mode_accepts_response_without_name() {
        let status = ReadyAfter::new(1);
        let confirmer = FixedConfirmer::new(true);

        let outcome = CommandPipeline::new(&status, "p", policy(), CancellationToken::new())
            .assume_yes(true)
            .asynchronous(true)
            .run(&confirmer, "Create?", || async { Ok::<_, CoreError>(Unnamed) })
            .await;

        assert!(matches!(outcome, Ok(PipelineOutcome::Triggered(Unnamed))));
    }
}
