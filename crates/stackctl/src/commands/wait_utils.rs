//! Shared pieces for commands that wait on long-running operations
//!
//! Wraps the core wait handler with an indicatif spinner and a dialoguer
//! confirmation prompt.

use std::io::IsTerminal;
use std::time::Duration;

use clap::Args;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use stackctl_core::wait::{DEFAULT_MAX_ELAPSED, DEFAULT_POLL_INTERVAL};
use stackctl_core::{
    Confirmer, CoreError, PollingPolicy, ProgressCallback, ProgressEvent, parse_duration_arg,
};

/// Common CLI arguments for commands that wait
#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    /// Maximum time to wait, e.g. 30m or 2h
    #[arg(long, value_parser = parse_duration_arg, default_value = "45m")]
    pub wait_timeout: Duration,

    /// Polling interval, e.g. 5s
    #[arg(long, value_parser = parse_duration_arg, default_value = "5s")]
    pub wait_interval: Duration,
}

impl Default for WaitArgs {
    fn default() -> Self {
        Self {
            wait_timeout: DEFAULT_MAX_ELAPSED,
            wait_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitArgs {
    pub fn policy(&self) -> PollingPolicy {
        PollingPolicy::new(self.wait_interval).with_max_elapsed(self.wait_timeout)
    }
}

/// Asks on the terminal; declines when stdin is not interactive
pub struct DialoguerConfirmer;

impl Confirmer for DialoguerConfirmer {
    fn confirm(&self, prompt: &str) -> stackctl_core::Result<bool> {
        if !std::io::stdin().is_terminal() {
            eprintln!("Warning: {} Use --assume-yes to skip confirmation.", prompt);
            return Ok(false);
        }

        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| CoreError::Prompt(e.to_string()))
    }
}

/// Ask for confirmation unless `assume_yes`; a declined prompt aborts
///
/// For commands that do not start a long-running operation and so do not
/// go through the pipeline.
pub fn confirm_or_abort(assume_yes: bool, prompt: &str) -> stackctl_core::Result<()> {
    if assume_yes || DialoguerConfirmer.confirm(prompt)? {
        Ok(())
    } else {
        Err(CoreError::Aborted)
    }
}

/// Spinner on stderr that follows the wait handler's progress events
///
/// Nothing is drawn before the wait starts, so a confirmation prompt
/// shown earlier is left alone.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
        {
            bar.set_style(style);
        }
        Self { bar }
    }

    /// Progress callback that drives this spinner
    pub fn callback(&self) -> ProgressCallback {
        let bar = self.bar.clone();
        Box::new(move |event: ProgressEvent| match event {
            ProgressEvent::Started { operation } => {
                bar.set_message(format!("Waiting for {}", operation));
                bar.enable_steady_tick(Duration::from_millis(120));
            }
            ProgressEvent::Polling {
                operation,
                status,
                attempt,
                ..
            } => {
                bar.set_message(format!("{}: {} (check {})", operation, status, attempt));
            }
            ProgressEvent::Completed { operation, elapsed } => {
                bar.finish_with_message(format!(
                    "\u{2713} {} done after {}s",
                    operation,
                    elapsed.as_secs()
                ));
            }
            ProgressEvent::Failed { operation, error } => {
                bar.abandon_with_message(format!("\u{2717} {}: {}", operation, error));
            }
        })
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = WaitArgs::default().policy();
        assert_eq!(policy.interval, Duration::from_secs(5));
        assert_eq!(policy.max_elapsed, Some(Duration::from_secs(45 * 60)));
    }

    #[test]
    fn test_assume_yes_skips_prompt() {
        assert!(confirm_or_abort(true, "Create?").is_ok());
    }

    #[test]
    fn test_policy_from_args() {
        let args = WaitArgs {
            wait_timeout: Duration::from_secs(600),
            wait_interval: Duration::from_secs(10),
        };
        let policy = args.policy();
        assert_eq!(policy.interval, Duration::from_secs(10));
        assert_eq!(policy.max_elapsed, Some(Duration::from_secs(600)));
    }
}
