use serde::{Deserialize, Serialize};

/// Result of a diagnostic check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub status: DiagnosticStatus,
    pub message: String,
    pub details: Option<String>,
    pub suggestion: Option<String>,
}

impl DiagnosticResult {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            status: DiagnosticStatus::Pass,
            message: message.into(),
            details: None,
            suggestion: None,
        }
    }

    pub fn fail(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status: DiagnosticStatus::Fail,
            message: message.into(),
            details: Some(details.into()),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn passed(&self) -> bool {
        self.status == DiagnosticStatus::Pass
    }
}

/// Status of a diagnostic check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DiagnosticStatus {
    Pass,
    Fail,
}

/// Summary of diagnostic results
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosticSummary {
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
}

impl DiagnosticSummary {
    pub fn from_results(results: &[DiagnosticResult]) -> Self {
        let passed = results.iter().filter(|r| r.passed()).count();
        Self {
            total_checks: results.len(),
            passed,
            failed: results.len() - passed,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
