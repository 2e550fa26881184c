//! Layered property store for one named configuration
//!
//! Lookup order, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. The configuration's profile file (`configurations/config_<name>`)
//! 3. Invocation flags (e.g. `--log-http`)
//! 4. Environment variables (`CLOUDSDK_<SECTION>_<KEY>`)
//!
//! Writes always target the profile file. The file is created lazily on the
//! first write and rewritten atomically on every write. Profiles are INI files
//! with bare values, the same layout the SDK itself writes.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use ini::{EscapePolicy, Ini, ParseOption, WriteOption};
use thiserror::Error;
use tracing::debug;

use crate::fs::{read_optional, write_atomic};

mod known;

pub use known::Property;

/// Section name -> key -> value, ordered for deterministic output.
pub type Sections = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("Unknown property [{0}]")]
    UnknownProperty(String),
    #[error("Failed to read configuration file [{path}]: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse configuration file [{path}]: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ini::ParseError,
    },
    #[error("Failed to write configuration file [{path}]: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to render properties: {0}")]
    Render(#[from] serde_yaml::Error),
}

#[derive(Debug)]
pub struct PropertyStore {
    profile_path: PathBuf,
    flags: BTreeMap<Property, String>,
    env: BTreeMap<Property, String>,
    cache: Mutex<Option<Sections>>,
}

impl PropertyStore {
    /// Store backed by `profile_path`, with the environment layer captured
    /// from the current process.
    pub fn new(profile_path: impl Into<PathBuf>) -> Self {
        Self::with_environment(profile_path, std::env::vars())
    }

    /// Store backed by `profile_path`, with the environment layer taken from
    /// `vars` instead of the process environment.
    pub fn with_environment<I>(profile_path: impl Into<PathBuf>, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env = vars
            .into_iter()
            .filter_map(|(key, value)| Property::from_env_var(&key).map(|p| (p, value)))
            .filter(|(_, value)| !value.is_empty())
            .collect();

        Self {
            profile_path: profile_path.into(),
            flags: BTreeMap::new(),
            env,
            cache: Mutex::new(None),
        }
    }

    pub fn profile_path(&self) -> &Path {
        &self.profile_path
    }

    /// Record a value supplied by an invocation flag.
    pub fn set_flag(&mut self, property: Property, value: impl Into<String>) {
        self.flags.insert(property, value.into());
    }

    /// Effective value of `property` across all layers.
    pub fn get(&self, property: Property) -> Result<Option<String>, PropertyError> {
        if let Some(value) = self.env.get(&property) {
            return Ok(Some(value.clone()));
        }
        if let Some(value) = self.flags.get(&property) {
            return Ok(Some(value.clone()));
        }
        let from_file = self.with_file(|sections| {
            sections
                .get(property.section())
                .and_then(|section| section.get(property.name()))
                .cloned()
        })?;
        Ok(from_file.or_else(|| property.default_value().map(str::to_string)))
    }

    /// Boolean view of a property: `true`, `1`, `yes` and `on` are true.
    pub fn get_bool(&self, property: Property) -> Result<bool, PropertyError> {
        Ok(self
            .get(property)?
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"))
            .unwrap_or(false))
    }

    /// Persist `value` for `property` in the profile file.
    pub fn set(&self, property: Property, value: &str) -> Result<(), PropertyError> {
        let mut sections = self.load_file()?;
        sections
            .entry(property.section().to_string())
            .or_default()
            .insert(property.name().to_string(), value.to_string());
        self.write_file(&sections)?;
        debug!(property = %property, value, "Property written");
        Ok(())
    }

    /// Drop cached file contents, e.g. after a subprocess edited the profile.
    pub fn invalidate(&self) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Values stored in the profile file only.
    pub fn file_values(&self) -> Result<Sections, PropertyError> {
        self.load_file()
    }

    /// Every explicitly set value: profile file, then flags, then environment.
    pub fn all_values(&self) -> Result<Sections, PropertyError> {
        let mut sections = self.load_file()?;
        for (property, value) in self.flags.iter().chain(self.env.iter()) {
            sections
                .entry(property.section().to_string())
                .or_default()
                .insert(property.name().to_string(), value.clone());
        }
        Ok(sections)
    }

    /// YAML rendering of [`PropertyStore::all_values`], sections and keys sorted.
    pub fn settings_dump(&self) -> Result<String, PropertyError> {
        Ok(serde_yaml::to_string(&self.all_values()?)?)
    }

    fn with_file<T>(&self, f: impl FnOnce(&Sections) -> T) -> Result<T, PropertyError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if cache.is_none() {
            *cache = Some(self.read_file()?);
        }
        Ok(f(cache.get_or_insert_with(Sections::new)))
    }

    fn load_file(&self) -> Result<Sections, PropertyError> {
        self.with_file(Sections::clone)
    }

    fn read_file(&self) -> Result<Sections, PropertyError> {
        let contents = read_optional(&self.profile_path).map_err(|source| PropertyError::Read {
            path: self.profile_path.clone(),
            source,
        })?;
        let Some(text) = contents else {
            return Ok(Sections::new());
        };
        // Values are taken literally: no quote stripping, no backslash escapes.
        let parsed = Ini::load_from_str_opt(
            &text,
            ParseOption {
                enabled_quote: false,
                enabled_escape: false,
                ..Default::default()
            },
        )
        .map_err(|source| PropertyError::Parse {
            path: self.profile_path.clone(),
            source,
        })?;

        let mut sections = Sections::new();
        for (name, keys) in parsed.iter() {
            // Keys above the first section header belong to no property.
            let Some(name) = name else { continue };
            let section = sections.entry(name.to_string()).or_default();
            for (key, value) in keys.iter() {
                section.insert(key.to_string(), value.to_string());
            }
        }
        sections.retain(|_, keys| !keys.is_empty());
        Ok(sections)
    }

    fn write_file(&self, sections: &Sections) -> Result<(), PropertyError> {
        let mut profile = Ini::new();
        for (name, keys) in sections {
            for (key, value) in keys {
                profile.with_section(Some(name.as_str())).set(key.as_str(), value.as_str());
            }
        }
        let mut rendered = Vec::new();
        profile
            .write_to_opt(
                &mut rendered,
                WriteOption {
                    escape_policy: EscapePolicy::Nothing,
                    kv_separator: " = ",
                    ..Default::default()
                },
            )
            .and_then(|()| write_atomic(&self.profile_path, &rendered))
            .map_err(|source| PropertyError::Write {
                path: self.profile_path.clone(),
                source,
            })?;
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = Some(sections.clone());
        Ok(())
    }
}
