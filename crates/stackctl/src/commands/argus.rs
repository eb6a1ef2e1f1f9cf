//! Argus command implementations

use stackctl_core::api::CreateCredentialsResponse;
use tracing::debug;
use uuid::Uuid;

use super::CommandContext;
use super::wait_utils::confirm_or_abort;
use crate::cli::{ArgusCommands, ArgusCredentialsCommands};
use crate::error::Result as CliResult;
use crate::output::print_output;

pub async fn handle_argus_command(cmd: &ArgusCommands, ctx: &CommandContext<'_>) -> CliResult<()> {
    match cmd {
        ArgusCommands::Credentials(ArgusCredentialsCommands::Create { instance_id }) => {
            create_credentials(ctx, instance_id).await
        }
    }
}

async fn create_credentials(ctx: &CommandContext<'_>, instance_id: &Uuid) -> CliResult<()> {
    let (client, project_id) = ctx.connect()?;
    let instance_id = instance_id.to_string();

    confirm_or_abort(
        ctx.assume_yes,
        &format!(
            "Are you sure you want to create credentials for instance {:?}?",
            instance_id
        ),
    )?;

    debug!("Creating credentials for Argus instance {}", instance_id);
    let response = client.create_credentials(&project_id, &instance_id).await?;

    if ctx.output.is_structured() {
        print_output(&response, ctx.output.structured())?;
    } else {
        print!("{}", format_credentials(&instance_id, &response));
    }
    Ok(())
}

fn format_credentials(instance_id: &str, response: &CreateCredentialsResponse) -> String {
    let mut out = format!("Created credentials for instance {:?}.\n\n", instance_id);
    if let Some(credentials) = &response.credentials {
        if let Some(username) = credentials.username.as_deref().filter(|u| !u.is_empty()) {
            out.push_str(&format!("Username: {}\n", username));
        }
        out.push_str(&format!(
            "Password: {}\n",
            credentials.password.as_deref().unwrap_or_default()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackctl_core::api::Credentials;

    #[test]
    fn test_username_and_password() {
        let response = CreateCredentialsResponse {
            credentials: Some(Credentials {
                username: Some("admin".to_string()),
                password: Some("s3cret".to_string()),
            }),
        };
        assert_eq!(
            format_credentials("abc", &response),
            "Created credentials for instance \"abc\".\n\nUsername: admin\nPassword: s3cret\n"
        );
    }

    #[test]
    fn test_empty_username_is_skipped() {
        let response = CreateCredentialsResponse {
            credentials: Some(Credentials {
                username: Some(String::new()),
                password: Some("s3cret".to_string()),
            }),
        };
        let out = format_credentials("abc", &response);
        assert!(!out.contains("Username"));
        assert!(out.ends_with("Password: s3cret\n"));
    }
}
