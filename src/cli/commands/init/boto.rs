//! Storage client side-config (`~/.boto`)
//!
//! The file is produced by the bundled `gsutil config -n` helper. An existing
//! file is never touched, and every skip is logged at debug level only.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use super::messages;
use crate::console::{Console, ConsoleError};
use crate::external::CommandExecutor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

pub struct SideConfigWriter {
    executor: Arc<dyn CommandExecutor>,
    sdk_root: Option<PathBuf>,
    home_dir: Option<PathBuf>,
    platform: Platform,
}

impl SideConfigWriter {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        sdk_root: Option<PathBuf>,
        home_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            executor,
            sdk_root,
            home_dir,
            platform: Platform::current(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn boto_path(&self) -> Option<PathBuf> {
        self.home_dir.as_ref().map(|home| home.join(".boto"))
    }

    /// Program and arguments that generate `boto_path`.
    fn command(&self, sdk_root: &Path, boto_path: &Path) -> (String, Vec<String>) {
        let bin = sdk_root.join("bin");
        let mut helper_args = vec![
            "config".to_string(),
            "-n".to_string(),
            "-o".to_string(),
            boto_path.display().to_string(),
        ];
        match self.platform {
            Platform::Unix => (bin.join("gsutil").display().to_string(), helper_args),
            Platform::Windows => {
                let mut args = vec![
                    "/c".to_string(),
                    bin.join("gsutil.cmd").display().to_string(),
                ];
                args.append(&mut helper_args);
                ("cmd".to_string(), args)
            }
        }
    }

    pub async fn write(&self, console: &mut Console) -> Result<(), ConsoleError> {
        let Some(sdk_root) = &self.sdk_root else {
            debug!("Could not find SDK root; not creating a .boto file");
            return Ok(());
        };
        let Some(boto_path) = self.boto_path() else {
            debug!("Could not find home directory; not creating a .boto file");
            return Ok(());
        };
        if boto_path.exists() {
            debug!(path = %boto_path.display(), "Not creating a .boto file, one already exists");
            return Ok(());
        }

        let (program, args) = self.command(sdk_root, &boto_path);
        match self.executor.execute(&program, &args).await {
            Ok(output) if output.success() => {
                console.status(&messages::boto_created(&boto_path.display().to_string()))
            }
            Ok(output) => {
                warn!(exit_code = output.status_code, stderr = %output.stderr.trim(), "gsutil config failed");
                console.status(messages::BOTO_FAILED)
            }
            Err(e) => {
                warn!(error = %e, "Could not run gsutil config");
                console.status(messages::BOTO_FAILED)
            }
        }
    }
}
