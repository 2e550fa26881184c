//! Child process execution
//!
//! Two modes: [`CommandExecutor::execute`] captures both output streams, while
//! [`CommandExecutor::execute_interactive`] leaves stderr on the user's
//! terminal so a subcommand can show prompts and read the answer from stdin.
//! Stdout is always captured for the caller to parse.

use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status_code: i32,
    pub stdout: String,
    /// Empty when the command ran interactively.
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == 0
    }
}

#[derive(Debug, Error, Clone)]
pub enum CommandError {
    #[error("could not start [{program}]: {message}")]
    Spawn { program: String, message: String },
    #[error("[{program}] was terminated by a signal")]
    Terminated { program: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `program` to completion with stdout and stderr captured.
    async fn execute(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError>;

    /// Run `program` with stderr shown to the user. Only stdout is captured.
    async fn execute_interactive(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<CommandOutput, CommandError>;
}

/// Spawns real child processes. Children always inherit stdin.
pub struct ProcessCommandExecutor;

impl ProcessCommandExecutor {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        stderr: Stdio,
    ) -> Result<CommandOutput, CommandError> {
        let spawn_error = |e: std::io::Error| CommandError::Spawn {
            program: program.to_string(),
            message: e.to_string(),
        };

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .spawn()
            .map_err(spawn_error)?;
        let output = child.wait_with_output().await.map_err(spawn_error)?;

        let status_code = output.status.code().ok_or_else(|| CommandError::Terminated {
            program: program.to_string(),
        })?;

        Ok(CommandOutput {
            status_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[async_trait]
impl CommandExecutor for ProcessCommandExecutor {
    async fn execute(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        tracing::debug!(program, ?args, "Executing command");
        self.run(program, args, Stdio::piped()).await
    }

    async fn execute_interactive(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<CommandOutput, CommandError> {
        tracing::debug!(program, ?args, "Executing interactive command");
        self.run(program, args, Stdio::inherit()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_captures_both_streams() {
        let output = ProcessCommandExecutor
            .execute("sh", &args(&["-c", "echo hello; echo oops >&2"]))
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "oops\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_interactive_leaves_stderr_on_terminal() {
        let script = "echo 'Go to the following link in your browser:' >&2; \
                      echo 'Enter verification code:' >&2; \
                      echo '{\"account\": \"foo@google.com\"}'";

        let output = ProcessCommandExecutor
            .execute_interactive("sh", &args(&["-c", script]))
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, "{\"account\": \"foo@google.com\"}\n");
        assert!(output.stderr.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_reports_exit_code() {
        let output = ProcessCommandExecutor
            .execute("sh", &args(&["-c", "exit 25"]))
            .await
            .unwrap();

        assert!(!output.success());
        assert_eq!(output.status_code, 25);
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_spawn() {
        let err = ProcessCommandExecutor
            .execute("nonexistent_command_xyz", &[])
            .await
            .unwrap_err();

        assert!(matches!(&err, CommandError::Spawn { program, .. } if program == "nonexistent_command_xyz"));
        assert!(err.to_string().starts_with("could not start [nonexistent_command_xyz]"));
    }

    #[tokio::test]
    async fn test_mock_command_executor() {
        let mut mock = MockCommandExecutor::new();
        mock.expect_execute_interactive()
            .with(eq("gcloud"), eq(args(&["auth", "login"])))
            .times(1)
            .returning(|_, _| {
                Ok(CommandOutput {
                    status_code: 0,
                    stdout: "{}\n".to_string(),
                    stderr: String::new(),
                })
            });

        let output = mock
            .execute_interactive("gcloud", &args(&["auth", "login"]))
            .await
            .unwrap();
        assert!(output.success());
        assert!(output.stderr.is_empty());
    }
}
