//! Invocation of sibling subcommands
//!
//! Init drives `auth login`, `compute project-info describe` and friends by
//! running the CLI itself with `--format=json` and parsing what it prints.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::command::{CommandError, CommandExecutor};

/// Exit code a subcommand uses to report that the user cancelled it.
pub const USER_CANCELLED_EXIT_CODE: i32 = 130;

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("Failed command: [{command}] with exit code [{exit_code}]")]
    Failed { command: String, exit_code: i32 },
    #[error("Failed to run command [{command}]: {source}")]
    Spawn {
        command: String,
        #[source]
        source: CommandError,
    },
    #[error("Command [{command}] printed output that is not valid JSON: {source}")]
    MalformedOutput {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl InvokeError {
    /// Exit code of the failed subcommand, if it ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            InvokeError::Failed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    pub fn is_user_cancelled(&self) -> bool {
        self.exit_code() == Some(USER_CANCELLED_EXIT_CODE)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SelfInvoker: Send + Sync {
    /// Run the subcommand `args`, returning its parsed JSON output.
    ///
    /// `Ok(None)` means the subcommand succeeded without printing anything.
    async fn invoke(&self, args: &[String]) -> Result<Option<Value>, InvokeError>;

    /// Like [`SelfInvoker::invoke`], but the subcommand talks to the user
    /// directly on the terminal. Used for `auth login`.
    async fn invoke_interactive(&self, args: &[String]) -> Result<Option<Value>, InvokeError>;
}

/// [`SelfInvoker`] that runs the CLI program as a child process.
pub struct CliInvoker {
    program: String,
    executor: Arc<dyn CommandExecutor>,
    log_http: bool,
}

impl CliInvoker {
    pub fn new(program: impl Into<String>, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            program: program.into(),
            executor,
            log_http: false,
        }
    }

    /// Forward `--log-http` to every subcommand.
    pub fn with_log_http(mut self, log_http: bool) -> Self {
        self.log_http = log_http;
        self
    }

    async fn run(&self, args: &[String], interactive: bool) -> Result<Option<Value>, InvokeError> {
        let mut full_args = args.to_vec();
        if self.log_http {
            full_args.push("--log-http".to_string());
        }
        let command = full_args.join(" ");
        full_args.push("--format=json".to_string());

        debug!(command = %command, interactive, "Invoking subcommand");
        let output = if interactive {
            self.executor.execute_interactive(&self.program, &full_args).await
        } else {
            self.executor.execute(&self.program, &full_args).await
        }
        .map_err(|source| InvokeError::Spawn {
            command: command.clone(),
            source,
        })?;

        if !output.success() {
            warn!(command = %command, exit_code = output.status_code, stderr = %output.stderr.trim(), "Subcommand failed");
            return Err(InvokeError::Failed {
                command,
                exit_code: output.status_code,
            });
        }

        let stdout = output.stdout.trim();
        if stdout.is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(stdout) {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(source) => Err(InvokeError::MalformedOutput { command, source }),
        }
    }
}

#[async_trait]
impl SelfInvoker for CliInvoker {
    async fn invoke(&self, args: &[String]) -> Result<Option<Value>, InvokeError> {
        self.run(args, false).await
    }

    async fn invoke_interactive(&self, args: &[String]) -> Result<Option<Value>, InvokeError> {
        self.run(args, true).await
    }
}

/// Build an owned argument vector from string literals.
pub fn args<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
