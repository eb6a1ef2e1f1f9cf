//! CLI-facing errors and how they are reported on stderr

use colored::Colorize;
use stackctl_core::CoreError;
use stackctl_core::api::ApiError;
use stackctl_core::config::ConfigError;
use thiserror::Error;

/// Exit code for a wait interrupted with Ctrl-C
pub const EXIT_CANCELLED: i32 = 130;

/// `error:` line followed by optional detail and tips, e.g.
/// ```text
/// error: Project ID is required
///
///   tip: pass it on the command line:
///       stackctl --project-id <ID> skcf cluster list
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// A tip, optionally followed by commands to try
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum StackCtlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("Project ID is required")]
    MissingProjectId,

    #[error("No API token configured")]
    MissingToken,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    #[error("Aborted by user")]
    Aborted,

    #[error("Interrupted")]
    Cancelled,

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

pub type Result<T> = std::result::Result<T, StackCtlError>;

impl StackCtlError {
    /// Hints printed under the error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            StackCtlError::ProfileNotFound { name } => vec![
                "List available profiles: stackctl profile list".to_string(),
                format!("Create profile '{}': stackctl profile set {} --token <token>", name, name),
            ],
            StackCtlError::MissingProjectId => vec![
                "Pass it on the command line: stackctl --project-id <ID> ...".to_string(),
                "Or set STACKCTL_PROJECT_ID".to_string(),
                "Or store it in a profile: stackctl profile set <name> --project-id <ID>".to_string(),
            ],
            StackCtlError::MissingToken => vec![
                "Store a token in a profile: stackctl profile set <name> --token <token>".to_string(),
                "Or set STACKCTL_TOKEN".to_string(),
            ],
            StackCtlError::AuthenticationFailed { .. } => vec![
                "Check your token: stackctl profile show <profile>".to_string(),
                "Service account tokens expire; issue a new one if needed".to_string(),
            ],
            StackCtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the API URL: stackctl profile show <profile>".to_string(),
            ],
            StackCtlError::NotFound { .. } => vec![
                "Verify the resource name or ID is correct".to_string(),
                "Check that you're using the correct project".to_string(),
            ],
            StackCtlError::Timeout { .. } => vec![
                "The operation may still complete; check its state with the describe command"
                    .to_string(),
                "Increase the limit with --wait-timeout".to_string(),
            ],
            StackCtlError::InvalidInput { .. } => vec![
                "Check the command syntax: stackctl <command> --help".to_string(),
            ],
            StackCtlError::FileError { path, .. } => vec![
                format!("Check that file exists: {}", path),
                "Verify file permissions are correct".to_string(),
            ],
            _ => vec![],
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            StackCtlError::Cancelled => EXIT_CANCELLED,
            _ => 1,
        }
    }

    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&format!("{}", self));

        if let StackCtlError::Timeout { .. } = self {
            diag = diag.detail("Stopped waiting; the remote operation was not cancelled.");
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<ApiError> for StackCtlError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized { message } => StackCtlError::AuthenticationFailed { message },
            ApiError::NotFound { message } => StackCtlError::NotFound { message },
            ApiError::BadRequest { message } => StackCtlError::InvalidInput { message },
            ApiError::Request(e) if e.is_connect() || e.is_timeout() => {
                StackCtlError::ConnectionError {
                    message: e.to_string(),
                }
            }
            other => StackCtlError::ApiError {
                message: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for StackCtlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Cancelled => StackCtlError::Cancelled,
            CoreError::Aborted => StackCtlError::Aborted,
            CoreError::Timeout(duration) => StackCtlError::Timeout {
                message: format!(
                    "operation did not finish within {} seconds",
                    duration.as_secs()
                ),
            },
            CoreError::OperationFailed(message) => StackCtlError::OperationFailed { message },
            err @ CoreError::MissingOperationName(_) => StackCtlError::ApiError {
                message: err.to_string(),
            },
            CoreError::InvalidDuration(message) | CoreError::Validation(message) => {
                StackCtlError::InvalidInput { message }
            }
            CoreError::Config(message) | CoreError::Prompt(message) => {
                StackCtlError::Config(message)
            }
            CoreError::Api(api_err) => StackCtlError::from(api_err),
            CoreError::StatusQueryFailed { operation, source } => {
                match source.downcast::<ApiError>() {
                    Ok(api_err) => StackCtlError::from(*api_err),
                    Err(source) => StackCtlError::ApiError {
                        message: format!("status query for {} failed: {}", operation, source),
                    },
                }
            }
            CoreError::Io { context, source } => StackCtlError::FileError {
                path: context,
                message: source.to_string(),
            },
        }
    }
}

impl From<ConfigError> for StackCtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => StackCtlError::ProfileNotFound { name },
            other => StackCtlError::Config(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StackCtlError {
    fn from(err: serde_json::Error) -> Self {
        StackCtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for StackCtlError {
    fn from(err: std::io::Error) -> Self {
        StackCtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for StackCtlError {
    fn from(err: anyhow::Error) -> Self {
        StackCtlError::Config(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn only_cancellation_exits_with_130() {
        assert_eq!(StackCtlError::from(CoreError::Cancelled).exit_code(), 130);
        assert_eq!(StackCtlError::from(CoreError::Aborted).exit_code(), 1);
        assert_eq!(
            StackCtlError::from(CoreError::Timeout(Duration::from_secs(60))).exit_code(),
            1
        );
    }

    #[test]
    fn failed_status_query_reports_the_api_error() {
        let err = StackCtlError::from(CoreError::StatusQueryFailed {
            operation: "p/c".to_string(),
            source: Box::new(ApiError::Unauthorized {
                message: "token expired".to_string(),
            }),
        });
        assert!(matches!(err, StackCtlError::AuthenticationFailed { .. }));
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn unnamed_submit_response_is_an_api_error() {
        let err = StackCtlError::from(CoreError::MissingOperationName("proj".into()));
        assert!(matches!(err, StackCtlError::ApiError { .. }));
        assert!(!matches!(err, StackCtlError::OperationFailed { .. }));
    }

    #[test]
    fn bad_duration_is_invalid_input() {
        let err = StackCtlError::from(CoreError::InvalidDuration("invalid time unit: x".into()));
        assert!(err.to_string().contains("invalid time unit"));
    }

    #[test]
    fn missing_profile_hint_names_it() {
        let err = StackCtlError::from(ConfigError::ProfileNotFound {
            name: "prod".to_string(),
        });
        assert!(err.suggestions()[1].contains("prod"));
    }
}
