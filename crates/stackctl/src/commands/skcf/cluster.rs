//! Cluster lifecycle commands

use stackctl_core::api::{ApiClient, Cluster, CreateOrUpdateClusterPayload};
use stackctl_core::skcf::{ClusterDeletion, ClusterReadiness, cluster_exists};
use stackctl_core::{CommandPipeline, CoreError, PipelineOutcome};
use tracing::{debug, info};

use crate::cli::ClusterCommands;
use crate::commands::CommandContext;
use crate::commands::utils::read_json_object;
use crate::commands::wait_utils::{DialoguerConfirmer, Spinner, WaitArgs};
use crate::error::Result as CliResult;
use crate::output::{cell, print_output, print_rows};

pub async fn handle_cluster_command(
    cmd: &ClusterCommands,
    ctx: &CommandContext<'_>,
) -> CliResult<()> {
    match cmd {
        ClusterCommands::Create {
            name,
            payload,
            wait,
        } => create(ctx, name, payload.as_deref(), wait).await,
        ClusterCommands::Update {
            name,
            payload,
            wait,
        } => update(ctx, name, payload, wait).await,
        ClusterCommands::Delete { name, wait } => delete(ctx, name, wait).await,
        ClusterCommands::Describe { name } => describe(ctx, name).await,
        ClusterCommands::List { limit } => list(ctx, *limit).await,
    }
}

fn parse_payload(payload: Option<&str>) -> CliResult<CreateOrUpdateClusterPayload> {
    Ok(CreateOrUpdateClusterPayload {
        fields: payload.map(read_json_object).transpose()?.unwrap_or_default(),
    })
}

/// Run create or update through the pipeline
#[allow(clippy::too_many_arguments)]
async fn apply(
    ctx: &CommandContext<'_>,
    client: &ApiClient,
    project_id: &str,
    name: &str,
    payload: &CreateOrUpdateClusterPayload,
    wait: &WaitArgs,
    prompt: &str,
    must_exist: bool,
) -> CliResult<PipelineOutcome<Cluster, Cluster>> {
    let readiness = ClusterReadiness::new(client);
    let spinner = Spinner::new();

    let outcome = CommandPipeline::new(&readiness, project_id, wait.policy(), ctx.cancel.clone())
        .assume_yes(ctx.assume_yes)
        .asynchronous(ctx.asynchronous)
        .on_progress(spinner.callback())
        .run(&DialoguerConfirmer, prompt, || async {
            let exists = cluster_exists(client, project_id, name).await?;
            if exists && !must_exist {
                return Err(CoreError::Validation(format!(
                    "cluster with name {} already exists",
                    name
                )));
            }
            if !exists && must_exist {
                return Err(CoreError::Validation(format!(
                    "cluster with name {} does not exist",
                    name
                )));
            }
            info!("Submitting cluster {} in project {}", name, project_id);
            Ok::<_, CoreError>(
                client
                    .create_or_update_cluster(project_id, name, payload)
                    .await?,
            )
        })
        .await?;

    Ok(outcome)
}

/// Print the outcome of a create or update
///
/// Structured output shows the cluster as the service last reported it.
fn print_applied(
    ctx: &CommandContext<'_>,
    outcome: &PipelineOutcome<Cluster, Cluster>,
    message: &str,
) -> CliResult<()> {
    if ctx.output.is_structured() {
        let cluster = match outcome {
            PipelineOutcome::Triggered(submitted) => submitted,
            PipelineOutcome::Completed { result, .. } => result,
        };
        print_output(cluster, ctx.output.structured())?;
    } else {
        println!("{}", message);
    }
    Ok(())
}

async fn create(
    ctx: &CommandContext<'_>,
    name: &str,
    payload: Option<&str>,
    wait: &WaitArgs,
) -> CliResult<()> {
    let payload = parse_payload(payload)?;
    let (client, project_id) = ctx.connect()?;
    debug!("Creating cluster {} in project {}", name, project_id);

    let prompt = format!(
        "Are you sure you want to create a cluster for project {:?}?",
        project_id
    );
    let outcome = apply(ctx, &client, &project_id, name, &payload, wait, &prompt, false).await?;

    let state = if outcome.is_triggered() {
        "Triggered creation of"
    } else {
        "Created"
    };
    print_applied(
        ctx,
        &outcome,
        &format!(
            "{} cluster for project {:?}. Cluster name: {}",
            state, project_id, name
        ),
    )
}

async fn update(
    ctx: &CommandContext<'_>,
    name: &str,
    payload: &str,
    wait: &WaitArgs,
) -> CliResult<()> {
    let payload = parse_payload(Some(payload))?;
    let (client, project_id) = ctx.connect()?;
    debug!("Updating cluster {} in project {}", name, project_id);

    let prompt = format!("Are you sure you want to update cluster {:?}?", name);
    let outcome = apply(ctx, &client, &project_id, name, &payload, wait, &prompt, true).await?;

    let state = if outcome.is_triggered() {
        "Triggered update of"
    } else {
        "Updated"
    };
    print_applied(
        ctx,
        &outcome,
        &format!("{} cluster {:?} in project {:?}", state, name, project_id),
    )
}

async fn delete(ctx: &CommandContext<'_>, name: &str, wait: &WaitArgs) -> CliResult<()> {
    let (client, project_id) = ctx.connect()?;
    debug!("Deleting cluster {} in project {}", name, project_id);

    let deletion = ClusterDeletion::new(&client);
    let spinner = Spinner::new();
    let prompt = format!(
        "Are you sure you want to delete cluster {:?}? (This cannot be undone)",
        name
    );

    let outcome = CommandPipeline::new(&deletion, &project_id, wait.policy(), ctx.cancel.clone())
        .assume_yes(ctx.assume_yes)
        .asynchronous(ctx.asynchronous)
        .on_progress(spinner.callback())
        .run(&DialoguerConfirmer, &prompt, || async {
            client.delete_cluster(&project_id, name).await?;
            Ok::<_, CoreError>(name.to_string())
        })
        .await?;

    let triggered = outcome.is_triggered();
    if ctx.output.is_structured() {
        let data = serde_json::json!({
            "name": name,
            "projectId": project_id,
            "status": if triggered { "deleting" } else { "deleted" },
        });
        print_output(data, ctx.output.structured())?;
    } else if triggered {
        println!("Triggered deletion of cluster {:?}", name);
    } else {
        println!("Deleted cluster {:?}", name);
    }
    Ok(())
}

fn cluster_row(cluster: &Cluster) -> Vec<String> {
    vec![
        cell(cluster.name.as_deref()),
        cell(cluster.aggregated_state()),
    ]
}

async fn describe(ctx: &CommandContext<'_>, name: &str) -> CliResult<()> {
    let (client, project_id) = ctx.connect()?;
    let cluster = client.get_cluster(&project_id, name).await?;

    if ctx.output.is_structured() {
        print_output(&cluster, ctx.output.structured())?;
    } else {
        print_rows(&["NAME", "STATE"], vec![cluster_row(&cluster)]);
        if let Some(status) = &cluster.status {
            for error in &status.errors {
                println!(
                    "error: {} {}",
                    cell(error.code.as_deref()),
                    cell(error.message.as_deref())
                );
            }
        }
    }
    Ok(())
}

async fn list(ctx: &CommandContext<'_>, limit: Option<u64>) -> CliResult<()> {
    let (client, project_id) = ctx.connect()?;
    let mut clusters = client.list_clusters(&project_id).await?.items;
    debug!("Found {} clusters", clusters.len());

    if let Some(limit) = limit {
        clusters.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }

    if ctx.output.is_structured() {
        print_output(&clusters, ctx.output.structured())?;
    } else if clusters.is_empty() {
        println!("No clusters found for project {:?}", project_id);
    } else {
        print_rows(&["NAME", "STATE"], clusters.iter().map(cluster_row).collect());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_is_empty_object() {
        let payload = parse_payload(None).unwrap();
        assert_eq!(serde_json::to_value(&payload).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_payload_fields_pass_through() {
        let payload = parse_payload(Some(r#"{"extensions": {"acl": true}}"#)).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"extensions": {"acl": true}})
        );
    }

    #[test]
    fn test_cluster_row_defaults() {
        let cluster = Cluster::default();
        assert_eq!(cluster_row(&cluster), vec!["-", "-"]);
    }
}
