//! Cloud Foundry (SKCF) cluster helpers
//!
//! Status collaborators for the wait handler plus the small pieces the
//! cluster and kubeconfig commands share. For plain API calls, use
//! [`crate::api::ApiClient`] directly.

pub mod status;
pub mod utils;

pub use status::*;
pub use utils::*;

use crate::api::Cluster;
use crate::pipeline::Submitted;

impl Submitted for Cluster {
    fn operation_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
