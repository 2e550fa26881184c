/// Interactive first-run setup
///
/// # Flow
///
/// Init walks the user through a fixed sequence of phases, each of which can
/// end the run early without an error:
///
/// 1. **Configuration**: reuse, create or switch to a named configuration.
/// 2. **Announce**: report which configuration is being initialized.
/// 3. **Diagnostics**: network reachability checks, skippable by flag.
/// 4. **Account**: pick a credentialed account or log in with a new one.
/// 5. **Project**: pick, enter or create the default project.
/// 6. **Compute**: default zone and region, from project metadata or a menu.
/// 7. **Side config**: generate `~/.boto` for the storage client.
/// 8. **Summary**: print what the configuration now contains.
///
/// Declining a prompt or cancelling a menu stops the run with exit status
/// zero. Failed subcommands and unwritable configuration files are errors.

pub mod accounts;
pub mod boto;
pub mod command;
pub mod compute;
pub mod configuration;
pub mod errors;
pub mod messages;
pub mod projects;
pub mod session;

// Re-export the main public API
pub use boto::{Platform, SideConfigWriter};
pub use command::{Collaborators, InitCommand, InitOptions, InitOutcome, Phase, PhaseOutcome};
pub use errors::InitError;
