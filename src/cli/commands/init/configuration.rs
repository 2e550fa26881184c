//! Choosing which named configuration the run initializes.

use tracing::{debug, info};

use super::errors::InitError;
use super::messages;
use super::session::Session;
use super::InitCommand;
use crate::configurations::DEFAULT_CONFIG_NAME;
use crate::properties::PropertyStore;

impl InitCommand {
    /// Settle on the configuration to initialize, creating or activating it
    /// as needed. `None` means the user cancelled the picker.
    pub(super) fn pick_configuration(
        &mut self,
        active: String,
        properties: PropertyStore,
    ) -> Result<Option<Session>, InitError> {
        let existing = self.registry.list()?;
        let from_env = self.registry.env_override().is_some();

        if !existing.contains(&active) {
            self.registry.ensure_exists(&active)?;
            if !from_env {
                self.registry.activate(&active)?;
            }
            debug!(configuration = %active, "Using new configuration");
            return Ok(Some(Session::new(active, properties)));
        }

        let lone_empty_default = existing.len() == 1
            && active == DEFAULT_CONFIG_NAME
            && properties.file_values()?.is_empty();
        if lone_empty_default {
            debug!("Reusing empty default configuration");
            return Ok(Some(Session::new(active, properties)));
        }

        let dump = properties.settings_dump()?;
        self.console
            .status(&messages::current_settings(&active, &dump))?;

        let others: Vec<&String> = existing.iter().filter(|name| **name != active).collect();
        let mut choices = vec![
            messages::reinitialize_choice(&active),
            messages::CREATE_CONFIGURATION_CHOICE.to_string(),
        ];
        choices.extend(others.iter().map(|name| messages::switch_choice(name)));

        let chosen = match self
            .console
            .prompt_choice(&choices, messages::PICK_CONFIGURATION)?
        {
            None => return Ok(None),
            Some(0) => return Ok(Some(Session::new(active, properties))),
            Some(1) => {
                let Some(name) = self
                    .console
                    .prompt_response(messages::ENTER_CONFIGURATION_NAME)?
                else {
                    return Ok(None);
                };
                let name = name.trim().to_string();
                self.registry.create(&name)?;
                info!(configuration = %name, "Created configuration");
                name
            }
            Some(index) => match others.get(index - 2) {
                Some(name) => (*name).clone(),
                None => return Ok(None),
            },
        };

        self.registry.activate(&chosen)?;
        let properties = self.open_store(&chosen);
        Ok(Some(Session::new(chosen, properties)))
    }
}
