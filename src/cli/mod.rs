use clap::{Parser, Subcommand};

use crate::cli::commands::init::InitOptions;

pub mod commands;

#[derive(Parser)]
#[command(name = "gcloud")]
#[command(about = "Google Cloud SDK first-run setup")]
#[command(long_about = "Walks through choosing a configuration, logging in, and picking a default \
                       project and Compute Engine zone and region. Start with 'gcloud init'.")]
pub struct Cli {
    /// Disable all interactive prompts
    #[arg(short = 'q', long, global = true, help = "Disable all interactive prompts")]
    pub quiet: bool,
    /// Log level for the structured log file
    #[arg(long, global = true, help = "Override the log level: debug, info, warning, error")]
    pub verbosity: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize or reinitialize gcloud
    Init {
        /// Do not launch a browser for authorization
        #[arg(long, alias = "no-launch-browser", help = "Prevent launching a browser for authorization")]
        console_only: bool,
        /// Skip the network diagnostics
        #[arg(long, help = "Do not run network diagnostics")]
        skip_diagnostics: bool,
        /// Account to use, if it has stored credentials
        #[arg(long, help = "Account to use for this configuration")]
        account: Option<String>,
        /// Project to use, created if it does not exist
        #[arg(long, help = "Project to use for this configuration")]
        project: Option<String>,
        /// Log HTTP requests made by subcommands
        #[arg(long, help = "Log all HTTP server requests and responses")]
        log_http: bool,
        /// No longer supported
        #[arg(hide = true)]
        positional: Vec<String>,
    },
}

impl Cli {
    /// Options for the init command, with global flags folded in.
    pub fn init_options(&self) -> InitOptions {
        match &self.command {
            Commands::Init {
                console_only,
                skip_diagnostics,
                account,
                project,
                log_http,
                positional,
            } => InitOptions {
                console_only: *console_only,
                skip_diagnostics: *skip_diagnostics,
                account: account.clone(),
                project: project.clone(),
                log_http: *log_http,
                disable_prompts: self.quiet,
                positional: positional.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_flags() {
        let cli = Cli::try_parse_from([
            "gcloud",
            "init",
            "--no-launch-browser",
            "--skip-diagnostics",
            "--account",
            "foo@google.com",
            "--project=golden-project",
        ])
        .unwrap();
        let options = cli.init_options();

        assert!(options.console_only);
        assert!(options.skip_diagnostics);
        assert_eq!(options.account.as_deref(), Some("foo@google.com"));
        assert_eq!(options.project.as_deref(), Some("golden-project"));
        assert!(!options.disable_prompts);
        assert!(options.positional.is_empty());
    }

    #[test]
    fn test_quiet_and_positional() {
        let cli = Cli::try_parse_from(["gcloud", "-q", "init", "my-project"]).unwrap();
        let options = cli.init_options();

        assert!(options.disable_prompts);
        assert_eq!(options.positional, vec!["my-project".to_string()]);
    }
}
