use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize structured JSON logging into `<logs_dir>/init.log`.
///
/// The error channel carries the interactive transcript, so log records never
/// go there. Fails without installing anything when the log file cannot be
/// opened.
pub fn init_telemetry(logs_dir: &Path, default_level: &str) -> Result<()> {
    let file = open_log_file(logs_dir)
        .with_context(|| format!("could not open log file in [{}]", logs_dir.display()))?;
    let writer = BoxMakeWriter::new(Mutex::new(file));

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(writer),
        )
        .with(filter)
        .try_init()?;

    tracing::debug!("Init telemetry initialized with structured logging");
    Ok(())
}

fn open_log_file(logs_dir: &Path) -> std::io::Result<fs::File> {
    fs::create_dir_all(logs_dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(logs_dir.join("init.log"))
}

/// Generate a correlation ID for linking the records of one invocation
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Root span for one `init` invocation
pub fn create_invocation_span(command: &str, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "cloudsdk_invocation",
        command = command,
        correlation.id = correlation_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = generate_correlation_id();
        let b = generate_correlation_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_log_file_created_in_logs_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let logs = temp.path().join("logs");

        open_log_file(&logs).unwrap();

        assert!(logs.join("init.log").exists());
    }

    #[test]
    fn test_unwritable_logs_dir_is_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        let not_a_dir = temp.path().join("config");
        fs::write(&not_a_dir, "").unwrap();

        let err = init_telemetry(&not_a_dir.join("logs"), "debug").unwrap_err();

        assert!(err.to_string().starts_with("could not open log file in ["));
    }
}
