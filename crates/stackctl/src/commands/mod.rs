//! Command implementations

pub mod argus;
pub mod profile;
pub mod skcf;
pub mod sqlserverflex;
pub mod utils;
pub mod wait_utils;

use stackctl_core::api::ApiClient;
use tokio_util::sync::CancellationToken;

use crate::cli::OutputFormat;
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;

/// Everything a service command needs besides its own arguments
pub struct CommandContext<'a> {
    pub conn_mgr: &'a ConnectionManager,
    pub profile: Option<&'a str>,
    pub project_id: Option<&'a str>,
    pub output: OutputFormat,
    pub assume_yes: bool,
    pub asynchronous: bool,
    pub cancel: CancellationToken,
}

impl CommandContext<'_> {
    /// Authenticated client plus the project to operate on
    pub fn connect(&self) -> CliResult<(ApiClient, String)> {
        let project_id = self
            .conn_mgr
            .resolve_project_id(self.project_id, self.profile)?;
        let client = self.conn_mgr.create_api_client(self.profile)?;
        Ok((client, project_id))
    }
}
