// Cloud SDK Init Library - interactive first-run setup for the SDK command line
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod configurations;
pub mod console;
pub mod credentials;
pub mod diagnostics;
pub mod external;
pub mod fs;
pub mod properties;
pub mod telemetry;

// Re-export key types for easy access
pub use cli::commands::init::{
    Collaborators, InitCommand, InitError, InitOptions, InitOutcome, Phase, SideConfigWriter,
};
pub use config::{config, init_config, SdkSettings};
pub use configurations::{ConfigurationError, ConfigurationRegistry};
pub use console::{Console, ConsoleError, TranscriptBuffer, UxStyle};
pub use credentials::{CredentialBroker, CredentialError, CredentialStore, LegacyCredentialStore};
pub use diagnostics::{Diagnostic, NetworkDiagnostic};
pub use external::{
    CliInvoker, CommandError, CommandExecutor, CommandOutput, InvokeError, ProcessCommandExecutor,
    ResourceManager, ResourceManagerError, RestResourceManager, SelfInvoker,
};
pub use properties::{Property, PropertyError, PropertyStore};
pub use telemetry::{generate_correlation_id, init_telemetry};
