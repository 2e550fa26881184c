use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, Instrument};

use cloudsdk_init::cli::Cli;
use cloudsdk_init::external::{CliAccessToken, CommandExecutor};
use cloudsdk_init::telemetry::create_invocation_span;
use cloudsdk_init::{
    generate_correlation_id, init_config, init_telemetry, CliInvoker, Collaborators, Console,
    ConfigurationRegistry, CredentialBroker, InitCommand, InitOutcome, LegacyCredentialStore,
    NetworkDiagnostic, ProcessCommandExecutor, RestResourceManager, SdkSettings, SelfInvoker,
    SideConfigWriter,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match init_config() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("ERROR: (gcloud.init) {e}");
            return ExitCode::FAILURE;
        }
    };

    let level = cli
        .verbosity
        .as_deref()
        .unwrap_or(settings.log_level.as_str());
    // The run goes on without a log file.
    if let Err(e) = init_telemetry(&settings.logs_dir(), level) {
        eprintln!("WARNING: Logging disabled: {e:#}");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("ERROR: (gcloud.init) {e}");
            return ExitCode::FAILURE;
        }
    };

    let correlation_id = generate_correlation_id();
    let span = create_invocation_span("init", &correlation_id);
    runtime.block_on(run(&cli, settings).instrument(span))
}

async fn run(cli: &Cli, settings: &SdkSettings) -> ExitCode {
    match build_command(cli, settings).execute().await {
        Ok(InitOutcome::Completed) => {
            info!("Init completed");
            ExitCode::SUCCESS
        }
        Ok(InitOutcome::Stopped(phase)) => {
            info!(phase = phase.as_str(), "Init stopped by user");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Init failed");
            eprintln!("ERROR: (gcloud.init) {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

fn build_command(cli: &Cli, settings: &SdkSettings) -> InitCommand {
    let options = cli.init_options();
    let executor: Arc<dyn CommandExecutor> = Arc::new(ProcessCommandExecutor);

    let invoker: Arc<dyn SelfInvoker> = Arc::new(
        CliInvoker::new(&settings.cli_program, executor.clone()).with_log_http(options.log_http),
    );
    let credentials = CredentialBroker::new(
        Arc::new(LegacyCredentialStore::new(settings.legacy_credentials_dir())),
        invoker.clone(),
    );
    let tokens = Arc::new(CliAccessToken::new(&settings.cli_program, executor.clone()));
    let resource_manager = Arc::new(
        RestResourceManager::new(&settings.resource_manager_endpoint, tokens)
            .with_polling(Duration::from_secs(2), 30),
    );
    let collaborators = Collaborators {
        invoker,
        credentials,
        resource_manager,
        diagnostics: Arc::new(NetworkDiagnostic::from_settings(&settings.diagnostics)),
        side_config: SideConfigWriter::new(
            executor,
            settings.sdk_root.clone(),
            settings.home_dir.clone(),
        ),
    };

    let registry = ConfigurationRegistry::new(&settings.config_dir);
    InitCommand::new(options, registry, Console::stdio(), collaborators)
}
