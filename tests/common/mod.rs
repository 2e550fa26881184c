//! Shared fakes for init integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;

use cloudsdk_init::cli::commands::init::Platform;
use cloudsdk_init::diagnostics::Diagnostic;
use cloudsdk_init::external::Project;
use cloudsdk_init::{
    Collaborators, CommandError, CommandExecutor, CommandOutput, ConfigurationRegistry, Console,
    ConsoleError, CredentialBroker, CredentialError, CredentialStore, InitCommand, InitError,
    InitOptions, InitOutcome, InvokeError, ResourceManager, ResourceManagerError, SelfInvoker,
    SideConfigWriter, TranscriptBuffer,
};

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Subcommand runner answering a fixed, ordered script of expected calls.
#[derive(Default)]
pub struct ScriptedInvoker {
    script: Mutex<VecDeque<(Vec<String>, Result<Option<Value>, InvokeError>)>>,
    interactive: Mutex<Vec<Vec<String>>>,
}

impl ScriptedInvoker {
    pub fn expect(&self, args: &[&str], response: Result<Option<Value>, InvokeError>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back((strings(args), response));
        self
    }

    pub fn remaining(&self) -> Vec<Vec<String>> {
        self.script
            .lock()
            .unwrap()
            .iter()
            .map(|(args, _)| args.clone())
            .collect()
    }

    /// Calls that were run with the terminal handed to the subcommand.
    pub fn interactive_calls(&self) -> Vec<Vec<String>> {
        self.interactive.lock().unwrap().clone()
    }

    fn answer(&self, args: &[String]) -> Result<Option<Value>, InvokeError> {
        let (expected, response) = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected subcommand {:?}", args));
        assert_eq!(args, expected.as_slice(), "subcommand out of order");
        response
    }
}

#[async_trait]
impl SelfInvoker for ScriptedInvoker {
    async fn invoke(&self, args: &[String]) -> Result<Option<Value>, InvokeError> {
        self.answer(args)
    }

    async fn invoke_interactive(&self, args: &[String]) -> Result<Option<Value>, InvokeError> {
        self.interactive.lock().unwrap().push(args.to_vec());
        self.answer(args)
    }
}

pub struct FakeCredentialStore {
    pub accounts: Vec<String>,
}

#[async_trait]
impl CredentialStore for FakeCredentialStore {
    async fn available_accounts(&self) -> Result<Vec<String>, CredentialError> {
        Ok(self.accounts.clone())
    }
}

/// Resource manager serving a fixed project list and recording creations.
#[derive(Default)]
pub struct FakeResourceManager {
    pub projects: Vec<String>,
    pub list_error: Option<String>,
    pub create_conflict: bool,
    pub created: Mutex<Vec<String>>,
}

#[async_trait]
impl ResourceManager for FakeResourceManager {
    async fn list_projects(&self, limit: Option<usize>) -> Result<Vec<Project>, ResourceManagerError> {
        if let Some(message) = &self.list_error {
            return Err(ResourceManagerError::Transport(message.clone()));
        }
        let mut projects: Vec<Project> = self.projects.iter().map(Project::new).collect();
        if let Some(limit) = limit {
            projects.truncate(limit);
        }
        Ok(projects)
    }

    async fn create_project(&self, project_id: &str) -> Result<Project, ResourceManagerError> {
        if self.create_conflict {
            return Err(ResourceManagerError::Http {
                status: 409,
                message: "Message.".to_string(),
            });
        }
        self.created.lock().unwrap().push(project_id.to_string());
        Ok(Project::new(project_id))
    }

    async fn is_active(&self, project_id: &str) -> Result<bool, ResourceManagerError> {
        Ok(self.projects.iter().any(|p| p == project_id))
    }
}

pub struct FakeDiagnostic {
    pub passes: bool,
}

#[async_trait]
impl Diagnostic for FakeDiagnostic {
    async fn run_checks(&self, _console: &mut Console) -> Result<bool, ConsoleError> {
        Ok(self.passes)
    }
}

/// Command executor that records every call and reports success.
#[derive(Default)]
pub struct RecordingExecutor {
    pub calls: Mutex<Vec<(String, Vec<String>)>>,
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn execute(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        self.record(program, args)
    }

    async fn execute_interactive(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<CommandOutput, CommandError> {
        self.record(program, args)
    }
}

impl RecordingExecutor {
    fn record(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));
        Ok(CommandOutput {
            status_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

/// One init run against a temporary configuration directory.
pub struct Harness {
    pub temp: TempDir,
    pub env: Vec<(String, String)>,
    pub options: InitOptions,
    pub accounts: Vec<String>,
    pub invoker: Arc<ScriptedInvoker>,
    pub resource_manager: Arc<FakeResourceManager>,
    pub diagnostics_pass: bool,
    pub executor: Arc<RecordingExecutor>,
    pub with_sdk_root: bool,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
            env: Vec::new(),
            options: InitOptions {
                skip_diagnostics: true,
                ..Default::default()
            },
            accounts: Vec::new(),
            invoker: Arc::new(ScriptedInvoker::default()),
            resource_manager: Arc::new(FakeResourceManager::default()),
            diagnostics_pass: true,
            executor: Arc::new(RecordingExecutor::default()),
            with_sdk_root: false,
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.temp.path().join("config")
    }

    pub fn home_dir(&self) -> PathBuf {
        self.temp.path().join("home")
    }

    pub fn registry(&self) -> ConfigurationRegistry {
        ConfigurationRegistry::with_environment(self.config_dir(), self.env.clone())
    }

    /// Registry that ignores the harness environment.
    pub fn plain_registry(&self) -> ConfigurationRegistry {
        ConfigurationRegistry::with_environment(self.config_dir(), Vec::new())
    }

    pub fn run(&self, input: &str) -> (Result<InitOutcome, InitError>, String) {
        std::fs::create_dir_all(self.home_dir()).unwrap();
        let sdk_root = self.with_sdk_root.then(|| PathBuf::from("fakesdkroot"));
        let collaborators = Collaborators {
            invoker: self.invoker.clone(),
            credentials: CredentialBroker::new(
                Arc::new(FakeCredentialStore {
                    accounts: self.accounts.clone(),
                }),
                self.invoker.clone(),
            ),
            resource_manager: self.resource_manager.clone(),
            diagnostics: Arc::new(FakeDiagnostic {
                passes: self.diagnostics_pass,
            }),
            side_config: SideConfigWriter::new(
                self.executor.clone(),
                sdk_root,
                Some(self.home_dir()),
            )
            .with_platform(Platform::Unix),
        };

        let transcript = TranscriptBuffer::new();
        let console = Console::scripted(input, transcript.clone());
        let command = InitCommand::new(self.options.clone(), self.registry(), console, collaborators);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let result = runtime.block_on(command.execute());
        (result, transcript.contents())
    }
}
