//! Account selection policy on top of the credential broker.

use tracing::{debug, info};

use super::errors::InitError;
use super::messages;
use super::session::Session;
use super::{InitCommand, PhaseOutcome};
use crate::credentials::LoginOutcome;

impl InitCommand {
    pub(super) async fn pick_account(&mut self, session: &mut Session) -> Result<PhaseOutcome, InitError> {
        let broker = &self.collaborators.credentials;
        let available = broker.available().await?;
        debug!(count = available.len(), "Credentialed accounts");

        let selected = match self.options.account.as_deref() {
            Some(preselected) if available.iter().any(|a| a == preselected) => {
                Some(preselected.to_string())
            }
            Some(preselected) => {
                self.console
                    .status(&messages::not_credentialed(preselected, &available))?;
                None
            }
            None if available.is_empty() => {
                if !self
                    .console
                    .prompt_continue(None, messages::MUST_LOG_IN, true)?
                {
                    info!("User declined to log in");
                    return Ok(PhaseOutcome::Stop);
                }
                None
            }
            None => {
                let mut choices = available.clone();
                choices.push(messages::NEW_ACCOUNT_CHOICE.to_string());
                match self
                    .console
                    .prompt_choice(&choices, messages::CHOOSE_ACCOUNT)?
                {
                    Some(index) if index < available.len() => Some(available[index].clone()),
                    Some(_) => None,
                    None => return Ok(PhaseOutcome::Stop),
                }
            }
        };

        let account = match selected {
            Some(account) => account,
            None => match broker
                .login(&session.properties, !self.options.console_only)
                .await?
            {
                LoginOutcome::LoggedIn(account) => account,
                LoginOutcome::Cancelled | LoginOutcome::NoAccount => {
                    info!("Login did not produce an account");
                    return Ok(PhaseOutcome::Stop);
                }
            },
        };

        broker.activate(&session.properties, &account)?;
        self.console.status(&messages::logged_in_as(&account))?;
        session.account = Some(account);
        Ok(PhaseOutcome::Continue)
    }
}
