//! Named configuration registry
//!
//! Each configuration is a profile file `<config_dir>/configurations/config_<name>`.
//! The pointer file `<config_dir>/active_config` names the active one; the
//! `CLOUDSDK_ACTIVE_CONFIG_NAME` environment variable overrides it and may name
//! a configuration that does not exist yet.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::fs::{read_optional, write_atomic};
use crate::properties::PropertyStore;

pub const DEFAULT_CONFIG_NAME: &str = "default";
pub const ACTIVE_CONFIG_ENV: &str = "CLOUDSDK_ACTIVE_CONFIG_NAME";

const RESERVED_NAME: &str = "NONE";
const CONFIG_FILE_PREFIX: &str = "config_";

static NAME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z][-a-z0-9]*$").ok());

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Invalid name [{0}] for a configuration.  Except for special cases (NONE), configuration names start with a lower case letter and contain only lower case letters a-z, digits 0-9, and hyphens '-'.")]
    InvalidName(String),
    #[error("Cannot create configuration [{0}], it already exists.")]
    AlreadyExists(String),
    #[error("Cannot activate configuration [{0}], it does not exist.")]
    NotFound(String),
    #[error("Failed to access configuration directory [{path}]: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Check a user-supplied configuration name.
pub fn validate_name(name: &str) -> Result<(), ConfigurationError> {
    let well_formed = NAME_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(name));
    if name == RESERVED_NAME || !well_formed {
        return Err(ConfigurationError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ConfigurationRegistry {
    config_dir: PathBuf,
    environment: Vec<(String, String)>,
}

impl ConfigurationRegistry {
    /// Registry rooted at `config_dir`, honouring the process environment.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self::with_environment(config_dir, std::env::vars())
    }

    /// Registry rooted at `config_dir` using `vars` in place of the process
    /// environment, both for the active-name override and for the property
    /// stores it hands out.
    pub fn with_environment<I>(config_dir: impl Into<PathBuf>, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            config_dir: config_dir.into(),
            environment: vars
                .into_iter()
                .filter(|(key, _)| key.starts_with("CLOUDSDK_"))
                .collect(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn configurations_dir(&self) -> PathBuf {
        self.config_dir.join("configurations")
    }

    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.configurations_dir()
            .join(format!("{}{}", CONFIG_FILE_PREFIX, name))
    }

    fn pointer_path(&self) -> PathBuf {
        self.config_dir.join("active_config")
    }

    /// Active configuration name forced by the environment, if any.
    pub fn env_override(&self) -> Option<&str> {
        self.environment
            .iter()
            .find(|(key, value)| key == ACTIVE_CONFIG_ENV && !value.is_empty())
            .map(|(_, value)| value.as_str())
    }

    /// Names of all existing configurations, sorted.
    pub fn list(&self) -> Result<Vec<String>, ConfigurationError> {
        let dir = self.configurations_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(ConfigurationError::Io { path: dir, source }),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ConfigurationError::Io {
                path: dir.clone(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(name) = file_name
                .to_str()
                .and_then(|f| f.strip_prefix(CONFIG_FILE_PREFIX))
            else {
                continue;
            };
            if validate_name(name).is_ok() && entry.path().is_file() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.profile_path(name).is_file()
    }

    /// Create an empty configuration.
    pub fn create(&self, name: &str) -> Result<(), ConfigurationError> {
        validate_name(name)?;
        if self.exists(name) {
            return Err(ConfigurationError::AlreadyExists(name.to_string()));
        }
        let path = self.profile_path(name);
        write_atomic(&path, b"").map_err(|source| ConfigurationError::Io { path, source })?;
        debug!(configuration = name, "Created configuration");
        Ok(())
    }

    /// Create `name` unless it already exists. Returns whether it was created.
    pub fn ensure_exists(&self, name: &str) -> Result<bool, ConfigurationError> {
        if self.exists(name) {
            return Ok(false);
        }
        self.create(name)?;
        Ok(true)
    }

    /// Point the active-configuration file at `name`.
    pub fn activate(&self, name: &str) -> Result<(), ConfigurationError> {
        validate_name(name)?;
        if !self.exists(name) {
            return Err(ConfigurationError::NotFound(name.to_string()));
        }
        let path = self.pointer_path();
        write_atomic(&path, name.as_bytes())
            .map_err(|source| ConfigurationError::Io { path, source })?;
        debug!(configuration = name, "Activated configuration");
        Ok(())
    }

    /// Name of the active configuration.
    ///
    /// The environment override wins, then the pointer file, then `default`.
    /// A pointer file holding an invalid name is reset to `default`.
    pub fn active_name(&self) -> Result<String, ConfigurationError> {
        if let Some(name) = self.env_override() {
            return Ok(name.to_string());
        }

        let path = self.pointer_path();
        let pointer = read_optional(&path).map_err(|source| ConfigurationError::Io {
            path: path.clone(),
            source,
        })?;
        let Some(pointer) = pointer else {
            return Ok(DEFAULT_CONFIG_NAME.to_string());
        };

        let name = pointer.trim();
        if validate_name(name).is_ok() {
            return Ok(name.to_string());
        }

        warn!(pointer = name, "Active configuration pointer is corrupt, resetting to default");
        write_atomic(&path, DEFAULT_CONFIG_NAME.as_bytes())
            .map_err(|source| ConfigurationError::Io { path, source })?;
        Ok(DEFAULT_CONFIG_NAME.to_string())
    }

    /// Property store for the named configuration.
    pub fn property_store(&self, name: &str) -> PropertyStore {
        PropertyStore::with_environment(self.profile_path(name), self.environment.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn registry(temp: &TempDir) -> ConfigurationRegistry {
        ConfigurationRegistry::with_environment(temp.path(), Vec::new())
    }

    #[test]
    fn test_fresh_registry_defaults() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);

        assert!(registry.list().unwrap().is_empty());
        assert_eq!(registry.active_name().unwrap(), "default");
    }

    #[test]
    fn test_create_list_activate() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);

        registry.create("other-one").unwrap();
        registry.create("active-one").unwrap();
        registry.activate("other-one").unwrap();

        assert_eq!(registry.list().unwrap(), vec!["active-one", "other-one"]);
        assert_eq!(registry.active_name().unwrap(), "other-one");
    }

    #[test]
    fn test_create_existing_fails() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);
        registry.create("good-one").unwrap();

        let err = registry.create("good-one").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot create configuration [good-one], it already exists."
        );
        assert!(!registry.ensure_exists("good-one").unwrap());
    }

    #[test]
    fn test_activate_missing_fails() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);

        assert!(matches!(
            registry.activate("ghost"),
            Err(ConfigurationError::NotFound(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_invalid_and_reserved_names() {
        for name in ["NONE", "Upper", "1abc", "has space", "", "under_score"] {
            assert!(validate_name(name).is_err(), "{name} should be rejected");
        }
        for name in ["default", "a", "my-config-2"] {
            assert!(validate_name(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn test_env_override_names_missing_configuration() {
        let temp = TempDir::new().unwrap();
        let registry = ConfigurationRegistry::with_environment(
            temp.path(),
            vec![(ACTIVE_CONFIG_ENV.to_string(), "foo".to_string())],
        );

        assert_eq!(registry.active_name().unwrap(), "foo");
        assert!(!registry.exists("foo"));
        assert!(registry.ensure_exists("foo").unwrap());
        assert!(registry.exists("foo"));
    }

    #[test]
    fn test_corrupt_pointer_resets_to_default() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);
        std::fs::write(temp.path().join("active_config"), "Not A Name!").unwrap();

        assert_eq!(registry.active_name().unwrap(), "default");
        assert_eq!(
            std::fs::read_to_string(temp.path().join("active_config")).unwrap(),
            "default"
        );
    }

    #[test]
    fn test_stray_files_are_not_listed() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);
        registry.create("real").unwrap();
        std::fs::write(registry.configurations_dir().join("notes.txt"), "").unwrap();
        std::fs::write(registry.configurations_dir().join("config_BAD"), "").unwrap();

        assert_eq!(registry.list().unwrap(), vec!["real"]);
    }

    proptest! {
        #[test]
        fn prop_valid_names_round_trip(name in "[a-z][-a-z0-9]{0,20}") {
            let temp = TempDir::new().unwrap();
            let registry = registry(&temp);
            registry.create(&name).unwrap();
            registry.activate(&name).unwrap();
            prop_assert_eq!(registry.active_name().unwrap(), name);
        }

        #[test]
        fn prop_names_with_uppercase_rejected(name in "[a-z]{0,5}[A-Z][a-z]{0,5}") {
            prop_assert!(validate_name(&name).is_err());
        }
    }
}
