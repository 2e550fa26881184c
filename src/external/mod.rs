//! External tool abstractions
//!
//! Trait-based seams around everything init reaches outside the process for:
//! child processes, sibling CLI subcommands and the resource manager API.
//! Production code wires the real implementations; tests substitute fakes.

pub mod command;
pub mod invoker;
pub mod resource_manager;

pub use command::{CommandError, CommandExecutor, CommandOutput, ProcessCommandExecutor};
pub use invoker::{args, CliInvoker, InvokeError, SelfInvoker, USER_CANCELLED_EXIT_CODE};
pub use resource_manager::{
    AccessTokenSource, CliAccessToken, Project, ResourceManager, ResourceManagerError,
    RestResourceManager,
};
