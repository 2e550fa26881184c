//! Credential broker
//!
//! Knows which accounts have stored credentials, which one the active
//! configuration uses, and how to acquire a new one by running the CLI's own
//! `auth login` subcommand.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::external::{InvokeError, SelfInvoker};
use crate::properties::{Property, PropertyError, PropertyStore};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Failed to read credential store [{path}]: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Invoke(#[from] InvokeError),
    #[error(transparent)]
    Property(#[from] PropertyError),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Accounts with stored credentials, sorted.
    async fn available_accounts(&self) -> Result<Vec<String>, CredentialError>;
}

/// Credential store laid out as one directory per account under
/// `<config_dir>/legacy_credentials`.
pub struct LegacyCredentialStore {
    dir: PathBuf,
}

impl LegacyCredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl CredentialStore for LegacyCredentialStore {
    async fn available_accounts(&self) -> Result<Vec<String>, CredentialError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(CredentialError::Store {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut accounts = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|source| CredentialError::Store {
                path: self.dir.clone(),
                source,
            })?;
            let Some(entry) = entry else { break };
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if let (true, Some(name)) = (is_dir, entry.file_name().to_str()) {
                accounts.push(name.to_string());
            }
        }
        accounts.sort();
        Ok(accounts)
    }
}

/// Result of running the login subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn(String),
    /// The user aborted the login flow.
    Cancelled,
    /// Login finished but did not report an account.
    NoAccount,
}

pub struct CredentialBroker {
    store: Arc<dyn CredentialStore>,
    invoker: Arc<dyn SelfInvoker>,
}

impl CredentialBroker {
    pub fn new(store: Arc<dyn CredentialStore>, invoker: Arc<dyn SelfInvoker>) -> Self {
        Self { store, invoker }
    }

    pub async fn available(&self) -> Result<Vec<String>, CredentialError> {
        self.store.available_accounts().await
    }

    pub fn current(&self, properties: &PropertyStore) -> Result<Option<String>, CredentialError> {
        Ok(properties.get(Property::CoreAccount)?)
    }

    /// Make `account` the one used by the configuration behind `properties`.
    pub fn activate(&self, properties: &PropertyStore, account: &str) -> Result<(), CredentialError> {
        properties.set(Property::CoreAccount, account)?;
        debug!(account, "Activated account");
        Ok(())
    }

    /// Run `auth login --force --brief`, adding `--no-launch-browser` when
    /// the browser must not be opened. The subcommand owns the terminal while
    /// it runs, so its verification prompts reach the user.
    ///
    /// The new account is taken from the `account` field the subcommand
    /// prints, or else from `core/account` if the subcommand changed it.
    pub async fn login(
        &self,
        properties: &PropertyStore,
        interactive_browser: bool,
    ) -> Result<LoginOutcome, CredentialError> {
        let mut args = vec![
            "auth".to_string(),
            "login".to_string(),
            "--force".to_string(),
            "--brief".to_string(),
        ];
        if !interactive_browser {
            args.push("--no-launch-browser".to_string());
        }

        let before = properties.get(Property::CoreAccount)?;
        let printed = match self.invoker.invoke_interactive(&args).await {
            Ok(value) => value,
            Err(e) if e.is_user_cancelled() => {
                info!("Login cancelled by user");
                return Ok(LoginOutcome::Cancelled);
            }
            Err(e) => return Err(e.into()),
        };

        let reported = printed
            .as_ref()
            .and_then(|value| value.get("account"))
            .and_then(|account| account.as_str())
            .filter(|account| !account.is_empty())
            .map(str::to_string);
        if let Some(account) = reported {
            return Ok(LoginOutcome::LoggedIn(account));
        }

        properties.invalidate();
        let after = properties.get(Property::CoreAccount)?;
        match after {
            Some(account) if Some(&account) != before.as_ref() => Ok(LoginOutcome::LoggedIn(account)),
            _ => Ok(LoginOutcome::NoAccount),
        }
    }
}
