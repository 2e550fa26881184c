use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for the init tool itself (not the SDK properties it manages)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SdkSettings {
    /// Per-user SDK configuration directory (configurations, credentials, logs)
    pub config_dir: PathBuf,
    /// SDK installation root; bundled helpers live under `<sdk_root>/bin`
    pub sdk_root: Option<PathBuf>,
    /// Home directory receiving the `.boto` side-config
    pub home_dir: Option<PathBuf>,
    /// Program invoked for sibling subcommands (`auth login`, `compute ...`)
    pub cli_program: String,
    /// Base URL of the resource manager REST API
    pub resource_manager_endpoint: String,
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Network diagnostics settings
    pub diagnostics: DiagnosticsSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiagnosticsSettings {
    /// URLs that must be reachable
    pub endpoints: Vec<String>,
    /// Per-request timeout
    pub timeout_seconds: u64,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            endpoints: vec![
                "https://accounts.google.com".to_string(),
                "https://cloudresourcemanager.googleapis.com/v1beta1/projects".to_string(),
                "https://www.googleapis.com/auth/cloud-platform".to_string(),
            ],
            timeout_seconds: 10,
        }
    }
}

impl Default for SdkSettings {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            sdk_root: None,
            home_dir: dirs::home_dir(),
            cli_program: "gcloud".to_string(),
            resource_manager_endpoint: "https://cloudresourcemanager.googleapis.com".to_string(),
            log_level: "info".to_string(),
            diagnostics: DiagnosticsSettings::default(),
        }
    }
}

/// `~/.config/gcloud` on Unix, `%APPDATA%\gcloud` on Windows.
fn default_config_dir() -> PathBuf {
    if cfg!(windows) {
        if let Some(app_data) = dirs::data_dir() {
            return app_data.join("gcloud");
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config").join("gcloud"))
        .unwrap_or_else(|| PathBuf::from(".config").join("gcloud"))
}

impl SdkSettings {
    /// Load settings from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (cloudsdk-init.toml)
    /// 3. Environment variables (prefixed with CLOUDSDK_INIT_)
    /// 4. The SDK's own CLOUDSDK_CONFIG and CLOUDSDK_ROOT_DIR variables
    pub fn load() -> Result<Self> {
        // Start with default configuration
        let mut builder = Config::builder().add_source(Config::try_from(&SdkSettings::default())?);

        if Path::new("cloudsdk-init.toml").exists() {
            builder = builder.add_source(File::with_name("cloudsdk-init"));
        }

        // Override with environment variables
        builder = builder.add_source(
            Environment::with_prefix("CLOUDSDK_INIT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut settings: SdkSettings = config.try_deserialize()?;

        // Special handling for the variables the SDK itself honours
        if let Some(dir) = non_empty_env("CLOUDSDK_CONFIG") {
            settings.config_dir = PathBuf::from(dir);
        }
        if let Some(root) = non_empty_env("CLOUDSDK_ROOT_DIR") {
            settings.sdk_root = Some(PathBuf::from(root));
        }

        Ok(settings)
    }

    /// Directory holding one subdirectory per credentialed account
    pub fn legacy_credentials_dir(&self) -> PathBuf {
        self.config_dir.join("legacy_credentials")
    }

    /// Directory receiving the structured log file
    pub fn logs_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::debug!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Global settings instance
static SETTINGS: std::sync::LazyLock<Result<SdkSettings, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = SdkSettings::load_env_file();
        SdkSettings::load()
    });

/// Get the global settings
pub fn config() -> Result<&'static SdkSettings> {
    SETTINGS
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize settings (called at startup)
pub fn init_config() -> Result<&'static SdkSettings> {
    let settings = config()?;
    tracing::debug!(config_dir = %settings.config_dir.display(), "Configuration loaded successfully");
    Ok(settings)
}
