//! # stackctl-core
//!
//! Library behind the `stackctl` command line tool. Everything here is
//! presentation free: values and errors go back to the caller, rendering
//! lives in the binary.
//!
//! ## Modules
//!
//! - [`duration`] - `<value><unit>` strings to seconds
//! - [`wait`] - polling a long-running operation until it finishes
//! - [`pipeline`] - confirm, submit, then wait (or not)
//! - [`api`] - typed HTTP client for the SKCF, Argus and SQLServer Flex services
//! - [`skcf`] - cluster status classifiers and kubeconfig helpers
//! - [`config`] - TOML profiles
//! - [`progress`] - progress events for spinners
//!
//! ## Example
//!
//! ```rust,ignore
//! use stackctl_core::api::ApiClient;
//! use stackctl_core::skcf::ClusterReadiness;
//! use stackctl_core::wait::{OperationHandle, PollingPolicy, WaitHandler};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = ApiClient::builder().token(token).build()?;
//! let readiness = ClusterReadiness::new(&client);
//!
//! let cluster = WaitHandler::new(
//!     &readiness,
//!     OperationHandle::new("my-project", "my-cluster"),
//!     PollingPolicy::default(),
//! )
//! .wait(&CancellationToken::new())
//! .await?;
//! ```

pub mod api;
pub mod config;
pub mod duration;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod skcf;
pub mod wait;

pub use duration::{parse_duration, parse_duration_arg};
pub use error::{BoxError, CoreError, Result};
pub use pipeline::{CommandPipeline, Confirmer, PipelineOutcome, Submitted};
pub use progress::{ProgressCallback, ProgressEvent};
pub use wait::{OperationHandle, OperationStatus, PollingPolicy, StatusClient, WaitHandler};
