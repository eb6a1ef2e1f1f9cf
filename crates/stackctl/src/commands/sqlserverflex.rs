//! SQLServer Flex command implementations

use stackctl_core::api::Instance;
use tracing::debug;
use uuid::Uuid;

use super::CommandContext;
use crate::cli::{SqlServerFlexCommands, SqlServerFlexInstanceCommands};
use crate::error::{Result as CliResult, StackCtlError};
use crate::output::{cell, print_details, print_output};

pub async fn handle_sqlserverflex_command(
    cmd: &SqlServerFlexCommands,
    ctx: &CommandContext<'_>,
) -> CliResult<()> {
    match cmd {
        SqlServerFlexCommands::Instance(SqlServerFlexInstanceCommands::Describe {
            instance_id,
        }) => describe(ctx, instance_id).await,
    }
}

async fn describe(ctx: &CommandContext<'_>, instance_id: &Uuid) -> CliResult<()> {
    let (client, project_id) = ctx.connect()?;
    let instance_id = instance_id.to_string();
    debug!("Describing SQLServer Flex instance {}", instance_id);

    let instance = client
        .get_instance(&project_id, &instance_id)
        .await?
        .item
        .ok_or_else(|| StackCtlError::NotFound {
            message: format!("instance {} returned no data", instance_id),
        })?;

    if ctx.output.is_structured() {
        print_output(&instance, ctx.output.structured())?;
    } else {
        print_details(&instance_rows(&instance));
    }
    Ok(())
}

fn instance_rows(instance: &Instance) -> Vec<(&'static str, String)> {
    let acl = instance
        .acl
        .as_ref()
        .map(|acl| acl.items.join(","))
        .filter(|items| !items.is_empty());
    let flavor = instance.flavor.as_ref();

    vec![
        ("ID", cell(instance.id.as_deref())),
        ("NAME", cell(instance.name.as_deref())),
        ("STATUS", cell(instance.status.as_deref())),
        (
            "STORAGE SIZE (GB)",
            cell(instance.storage.as_ref().and_then(|s| s.size)),
        ),
        ("VERSION", cell(instance.version.as_deref())),
        (
            "BACKUP SCHEDULE (UTC)",
            cell(instance.backup_schedule.as_deref()),
        ),
        ("ACL", cell(acl)),
        (
            "FLAVOR DESCRIPTION",
            cell(flavor.and_then(|f| f.description.as_deref())),
        ),
        ("CPU", cell(flavor.and_then(|f| f.cpu))),
        ("RAM (GB)", cell(flavor.and_then(|f| f.memory))),
    ]
}
