use thiserror::Error;

use super::messages;
use crate::configurations::ConfigurationError;
use crate::console::ConsoleError;
use crate::credentials::CredentialError;
use crate::external::InvokeError;
use crate::properties::PropertyError;

/// Errors that end an init run with a non-zero exit code.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Invalid value for [{argument}]: {message}")]
    InvalidArgument { argument: String, message: String },
    #[error(transparent)]
    Console(#[from] ConsoleError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Property(#[from] PropertyError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    SubCommand(#[from] InvokeError),
}

impl InitError {
    pub fn positional_argument(argument: &str) -> Self {
        InitError::InvalidArgument {
            argument: argument.to_string(),
            message: messages::POSITIONAL_REMOVED.to_string(),
        }
    }

    pub fn prompts_disabled() -> Self {
        InitError::InvalidArgument {
            argument: messages::DISABLED_PROMPTS_ARGUMENT.to_string(),
            message: messages::DISABLED_PROMPTS.to_string(),
        }
    }

    /// Process exit code: a failed subcommand's own code, otherwise 1.
    pub fn exit_code(&self) -> i32 {
        let failed = match self {
            InitError::SubCommand(e) => e.exit_code(),
            InitError::Credential(CredentialError::Invoke(e)) => e.exit_code(),
            _ => None,
        };
        failed.filter(|code| *code != 0).unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_messages() {
        assert_eq!(
            InitError::prompts_disabled().to_string(),
            "Invalid value for [disable_prompts/--quiet]: gcloud init command cannot run with disabled prompts."
        );
        assert!(InitError::positional_argument("my-project")
            .to_string()
            .starts_with("Invalid value for [my-project]: `gcloud init` has changed"));
    }

    #[test]
    fn test_exit_code_follows_subcommand() {
        let failed = InvokeError::Failed {
            command: "auth login --force --brief".to_string(),
            exit_code: 25,
        };
        assert_eq!(InitError::Credential(CredentialError::Invoke(failed)).exit_code(), 25);
        assert_eq!(InitError::prompts_disabled().exit_code(), 1);
    }
}
