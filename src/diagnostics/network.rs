//! Network reachability diagnostic
//!
//! Issues one GET per configured endpoint. Any HTTP response, whatever its
//! status, proves the host is reachable; only transport failures count.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::types::{DiagnosticResult, DiagnosticSummary};
use super::Diagnostic;
use crate::config::DiagnosticsSettings;
use crate::console::{Console, ConsoleError};

const CHECK_NAME: &str = "Reachability Check";

pub struct NetworkDiagnostic {
    client: reqwest::Client,
    endpoints: Vec<String>,
}

impl NetworkDiagnostic {
    pub fn new(endpoints: Vec<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client for diagnostics");
                reqwest::Client::new()
            });
        Self { client, endpoints }
    }

    pub fn from_settings(settings: &DiagnosticsSettings) -> Self {
        Self::new(
            settings.endpoints.clone(),
            Duration::from_secs(settings.timeout_seconds),
        )
    }

    /// Check every endpoint and fold the outcome into one result.
    pub async fn check_reachability(&self) -> DiagnosticResult {
        let mut unreachable = Vec::new();
        for url in &self.endpoints {
            match self.client.get(url).send().await {
                Ok(response) => {
                    debug!(url = %url, status = response.status().as_u16(), "Endpoint reachable");
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Endpoint unreachable");
                    unreachable.push(format!("Cannot reach {} ({})", url, e));
                }
            }
        }

        if unreachable.is_empty() {
            DiagnosticResult::pass(format!("{} passed.", CHECK_NAME))
        } else {
            DiagnosticResult::fail(format!("{} failed.", CHECK_NAME), unreachable.join("\n"))
                .with_suggestion("Check your proxy settings and network connection.")
        }
    }
}

#[async_trait]
impl Diagnostic for NetworkDiagnostic {
    async fn run_checks(&self, console: &mut Console) -> Result<bool, ConsoleError> {
        console.status("Network diagnostic detects and fixes local network connection issues.\n")?;
        console.status("Checking network connection...")?;
        let result = self.check_reachability().await;
        console.status("done.\n")?;

        console.status(&format!("{}\n", result.message))?;
        if let Some(details) = &result.details {
            for line in details.lines() {
                console.status(&format!("    {}\n", line))?;
            }
        }
        if let Some(suggestion) = &result.suggestion {
            console.status(&format!("{}\n", suggestion))?;
        }

        let summary = DiagnosticSummary::from_results(std::slice::from_ref(&result));
        let verdict = if summary.all_passed() { "passed" } else { "failed" };
        console.status(&format!(
            "Network diagnostic {} ({}/{} checks passed).\n\n",
            verdict, summary.passed, summary.total_checks
        ))?;
        Ok(summary.all_passed())
    }
}
