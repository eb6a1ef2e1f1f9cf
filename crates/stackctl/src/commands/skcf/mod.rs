//! SKCF command implementations

pub mod cluster;
pub mod kubeconfig;

use tracing::debug;

use super::CommandContext;
use crate::cli::SkcfCommands;
use crate::error::Result as CliResult;

pub async fn handle_skcf_command(cmd: &SkcfCommands, ctx: &CommandContext<'_>) -> CliResult<()> {
    match cmd {
        SkcfCommands::Cluster(cluster_cmd) => {
            debug!("Executing skcf cluster command");
            cluster::handle_cluster_command(cluster_cmd, ctx).await
        }
        SkcfCommands::Kubeconfig(kubeconfig_cmd) => {
            debug!("Executing skcf kubeconfig command");
            kubeconfig::handle_kubeconfig_command(kubeconfig_cmd, ctx).await
        }
    }
}
