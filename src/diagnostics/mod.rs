//! Preflight diagnostics run before credentials are touched.

use async_trait::async_trait;

use crate::console::{Console, ConsoleError};

pub mod network;
pub mod types;

pub use network::NetworkDiagnostic;
pub use types::{DiagnosticResult, DiagnosticStatus, DiagnosticSummary};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Diagnostic: Send + Sync {
    /// Run every check, reporting progress on `console`. Returns whether all
    /// checks passed.
    async fn run_checks(&self, console: &mut Console) -> Result<bool, ConsoleError>;
}
