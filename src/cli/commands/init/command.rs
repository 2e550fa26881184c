use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use super::boto::SideConfigWriter;
use super::compute::ComputePicker;
use super::errors::InitError;
use super::messages;
use super::projects::ProjectPicker;
use super::session::Session;
use crate::configurations::ConfigurationRegistry;
use crate::console::{Console, UxStyle};
use crate::credentials::CredentialBroker;
use crate::diagnostics::Diagnostic;
use crate::external::{ResourceManager, SelfInvoker};
use crate::properties::{Property, PropertyStore};

/// Flags of a single `init` invocation.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Never open a browser during login.
    pub console_only: bool,
    pub skip_diagnostics: bool,
    pub account: Option<String>,
    pub project: Option<String>,
    pub log_http: bool,
    /// Global `--quiet`.
    pub disable_prompts: bool,
    /// Leftover positional arguments, which init rejects.
    pub positional: Vec<String>,
}

/// Everything init talks to outside the configuration directory.
pub struct Collaborators {
    pub invoker: Arc<dyn SelfInvoker>,
    pub credentials: CredentialBroker,
    pub resource_manager: Arc<dyn ResourceManager>,
    pub diagnostics: Arc<dyn Diagnostic>,
    pub side_config: SideConfigWriter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PickConfiguration,
    Announce,
    Diagnostics,
    Account,
    Project,
    Compute,
    SideConfig,
    Summary,
}

impl Phase {
    /// Phases run once a configuration has been picked, in order.
    pub const SEQUENCE: [Phase; 7] = [
        Phase::Announce,
        Phase::Diagnostics,
        Phase::Account,
        Phase::Project,
        Phase::Compute,
        Phase::SideConfig,
        Phase::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::PickConfiguration => "pick_configuration",
            Phase::Announce => "announce",
            Phase::Diagnostics => "diagnostics",
            Phase::Account => "account",
            Phase::Project => "project",
            Phase::Compute => "compute",
            Phase::SideConfig => "side_config",
            Phase::Summary => "summary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    Continue,
    Stop,
}

/// How a run that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Completed,
    /// The user declined or cancelled during the given phase. Nothing after it
    /// ran; exit status stays zero.
    Stopped(Phase),
}

pub struct InitCommand {
    pub(super) options: InitOptions,
    pub(super) registry: ConfigurationRegistry,
    pub(super) console: Console,
    pub(super) collaborators: Collaborators,
}

impl InitCommand {
    pub fn new(
        options: InitOptions,
        registry: ConfigurationRegistry,
        console: Console,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            options,
            registry,
            console,
            collaborators,
        }
    }

    pub async fn execute(mut self) -> Result<InitOutcome, InitError> {
        if let Some(argument) = self.options.positional.first() {
            return Err(InitError::positional_argument(argument));
        }

        self.console.status(messages::WELCOME)?;

        let active = self.registry.active_name()?;
        let properties = self.open_store(&active);
        self.apply_style(&properties)?;
        self.console.set_prompts_disabled(
            self.options.disable_prompts || properties.get_bool(Property::CoreDisablePrompts)?,
        );
        if self.console.prompts_disabled() {
            return Err(InitError::prompts_disabled());
        }

        let Some(mut session) = self.pick_configuration(active, properties)? else {
            info!("Configuration picker cancelled");
            return Ok(InitOutcome::Stopped(Phase::PickConfiguration));
        };
        self.apply_style(&session.properties)?;
        info!(configuration = %session.configuration, "Initializing configuration");

        for phase in Phase::SEQUENCE {
            let span = info_span!("init_phase", phase = phase.as_str());
            let outcome = self.run_phase(phase, &mut session).instrument(span).await?;
            if outcome == PhaseOutcome::Stop {
                info!(phase = phase.as_str(), "Init stopped");
                return Ok(InitOutcome::Stopped(phase));
            }
        }

        Ok(InitOutcome::Completed)
    }

    async fn run_phase(
        &mut self,
        phase: Phase,
        session: &mut Session,
    ) -> Result<PhaseOutcome, InitError> {
        match phase {
            Phase::PickConfiguration => Ok(PhaseOutcome::Continue),
            Phase::Announce => {
                self.console
                    .status(&messages::current_configuration(&session.configuration))?;
                Ok(PhaseOutcome::Continue)
            }
            Phase::Diagnostics => self.run_diagnostics().await,
            Phase::Account => self.pick_account(session).await,
            Phase::Project => self.pick_project(session).await,
            Phase::Compute => {
                let defaults = ComputePicker::new(
                    &mut self.console,
                    self.collaborators.invoker.as_ref(),
                    &session.properties,
                )
                .pick()
                .await?;
                session.zone = defaults.zone;
                session.region = defaults.region;
                Ok(PhaseOutcome::Continue)
            }
            Phase::SideConfig => {
                self.collaborators
                    .side_config
                    .write(&mut self.console)
                    .await?;
                Ok(PhaseOutcome::Continue)
            }
            Phase::Summary => {
                self.console.status(&messages::ready_to_use(
                    &session.configuration,
                    session.account.as_deref().unwrap_or_default(),
                    session.project.as_deref().unwrap_or_default(),
                    session.region.as_deref(),
                    session.zone.as_deref(),
                ))?;
                Ok(PhaseOutcome::Continue)
            }
        }
    }

    async fn run_diagnostics(&mut self) -> Result<PhaseOutcome, InitError> {
        if self.options.skip_diagnostics {
            return Ok(PhaseOutcome::Continue);
        }

        self.console.status(messages::SKIP_DIAGNOSTICS_HINT)?;
        let passed = self
            .collaborators
            .diagnostics
            .run_checks(&mut self.console)
            .await?;
        if passed {
            return Ok(PhaseOutcome::Continue);
        }

        let proceed = self.console.prompt_continue(
            Some(messages::NETWORK_ERRORS),
            messages::CONTINUE_ANYWAY,
            false,
        )?;
        if proceed {
            Ok(PhaseOutcome::Continue)
        } else {
            self.console.status(messages::RERUN_DIAGNOSTICS_HINT)?;
            Ok(PhaseOutcome::Stop)
        }
    }

    async fn pick_project(&mut self, session: &mut Session) -> Result<PhaseOutcome, InitError> {
        let picked = ProjectPicker::new(
            &mut self.console,
            self.collaborators.resource_manager.as_ref(),
        )
        .pick(self.options.project.as_deref())
        .await?;

        let Some(project) = picked else {
            return Ok(PhaseOutcome::Stop);
        };
        session.properties.set(Property::CoreProject, &project)?;
        self.console.status(&messages::current_project(&project))?;
        session.project = Some(project);
        Ok(PhaseOutcome::Continue)
    }

    /// Property store for `name`, layered with this invocation's flags.
    pub(super) fn open_store(&self, name: &str) -> PropertyStore {
        let mut store = self.registry.property_store(name);
        if self.options.log_http {
            store.set_flag(Property::CoreLogHttp, "true");
        }
        store
    }

    fn apply_style(&mut self, properties: &PropertyStore) -> Result<(), InitError> {
        let style = properties.get(Property::CoreInteractiveUxStyle)?;
        self.console.set_style(UxStyle::from_property(style.as_deref()));
        Ok(())
    }
}
