//! Project selection
//!
//! Lists the account's projects and lets the user pick one, enter one or
//! create one. Listing and creation failures are reported as warnings and
//! never abort the run; a failed creation leaves no project selected.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use super::messages;
use crate::console::{Console, ConsoleError};
use crate::external::{ResourceManager, ResourceManagerError};

/// Listings longer than this switch to the large-account menu.
pub const PROJECT_LIST_LIMIT: usize = 200;

static PROJECT_ID_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$").ok());

pub fn is_valid_project_id(project_id: &str) -> bool {
    PROJECT_ID_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(project_id))
}

enum Selection {
    Chosen(String),
    Create,
}

pub struct ProjectPicker<'a> {
    console: &'a mut Console,
    resource_manager: &'a dyn ResourceManager,
    list_limit: usize,
}

impl<'a> ProjectPicker<'a> {
    pub fn new(console: &'a mut Console, resource_manager: &'a dyn ResourceManager) -> Self {
        Self {
            console,
            resource_manager,
            list_limit: PROJECT_LIST_LIMIT,
        }
    }

    pub fn with_list_limit(mut self, limit: usize) -> Self {
        self.list_limit = limit;
        self
    }

    /// Settle on a project id, or `None` when the user backed out or the
    /// project could not be created.
    pub async fn pick(&mut self, preselected: Option<&str>) -> Result<Option<String>, ConsoleError> {
        let Some(project_ids) = self.list(Some(self.list_limit + 1)).await? else {
            return match preselected {
                Some(project) => Ok(Some(project.to_string())),
                None => self.console.prompt_response(messages::ENTER_ANY_PROJECT_ID),
            };
        };

        if project_ids.len() > self.list_limit {
            return self.pick_from_many(preselected).await;
        }

        if let Some(project) = preselected {
            if project_ids.iter().any(|id| id == project) {
                debug!(project, "Preselected project is listed");
                return Ok(Some(project.to_string()));
            }
            let message = if project_ids.is_empty() {
                messages::NO_PROJECTS.to_string()
            } else {
                messages::not_your_project(project, &project_ids)
            };
            if !self
                .console
                .prompt_continue(Some(&message), messages::CREATE_IT, true)?
            {
                return Ok(None);
            }
            return self.create(project).await;
        }

        match self.choose(&project_ids)? {
            Some(Selection::Chosen(project)) => Ok(Some(project)),
            Some(Selection::Create) => self.create_entered().await,
            None => Ok(None),
        }
    }

    fn choose(&mut self, project_ids: &[String]) -> Result<Option<Selection>, ConsoleError> {
        if project_ids.is_empty() {
            let create = self.console.prompt_continue(
                Some(messages::NO_PROJECTS),
                messages::CREATE_ONE,
                true,
            )?;
            return Ok(create.then_some(Selection::Create));
        }

        let mut choices = project_ids.to_vec();
        choices.push(messages::CREATE_PROJECT_CHOICE.to_string());
        let selection = self
            .console
            .prompt_choice(&choices, messages::PICK_PROJECT)?
            .map(|index| match project_ids.get(index) {
                Some(project) => Selection::Chosen(project.clone()),
                None => Selection::Create,
            });
        Ok(selection)
    }

    async fn pick_from_many(&mut self, preselected: Option<&str>) -> Result<Option<String>, ConsoleError> {
        if let Some(project) = preselected {
            if self.is_active(project).await {
                return Ok(Some(project.to_string()));
            }
            if !self
                .console
                .prompt_continue(Some(&messages::not_an_active_project(project)), messages::CREATE_IT, true)?
            {
                return Ok(None);
            }
            return self.create(project).await;
        }

        let choices = vec![
            messages::ENTER_PROJECT_ID_CHOICE.to_string(),
            messages::CREATE_PROJECT_CHOICE.to_string(),
            messages::LIST_PROJECTS_CHOICE.to_string(),
        ];
        match self.console.prompt_choice(&choices, messages::MANY_PROJECTS)? {
            Some(0) => self.enter_existing().await,
            Some(1) => self.create_entered().await,
            Some(_) => {
                let Some(project_ids) = self.list(None).await? else {
                    return self.console.prompt_response(messages::ENTER_ANY_PROJECT_ID);
                };
                match self.choose(&project_ids)? {
                    Some(Selection::Chosen(project)) => Ok(Some(project)),
                    Some(Selection::Create) => self.create_entered().await,
                    None => Ok(None),
                }
            }
            None => Ok(None),
        }
    }

    async fn enter_existing(&mut self) -> Result<Option<String>, ConsoleError> {
        loop {
            let Some(project) = self
                .console
                .prompt_response(messages::ENTER_EXISTING_PROJECT_ID)?
            else {
                return Ok(None);
            };
            if self.is_active(&project).await {
                return Ok(Some(project));
            }
            self.console.status(messages::INACTIVE_PROJECT)?;
        }
    }

    async fn is_active(&self, project: &str) -> bool {
        match self.resource_manager.is_active(project).await {
            Ok(active) => active,
            Err(e) => {
                warn!(project, error = %e, "Could not look up project");
                false
            }
        }
    }

    /// Sorted project ids, or `None` when listing failed.
    async fn list(&mut self, limit: Option<usize>) -> Result<Option<Vec<String>>, ConsoleError> {
        match self.resource_manager.list_projects(limit).await {
            Ok(projects) => {
                let mut ids: Vec<String> = projects.into_iter().map(|p| p.project_id).collect();
                ids.sort();
                Ok(Some(ids))
            }
            Err(e) => {
                warn!(error = %e, "Listing projects failed");
                self.console.warning(&messages::listing_failed(&e.to_string()))?;
                Ok(None)
            }
        }
    }

    async fn create_entered(&mut self) -> Result<Option<String>, ConsoleError> {
        match self.console.prompt_response(messages::ENTER_PROJECT_ID)? {
            Some(project) => self.create(&project).await,
            None => Ok(None),
        }
    }

    async fn create(&mut self, project: &str) -> Result<Option<String>, ConsoleError> {
        if !is_valid_project_id(project) {
            let reason = format!(
                "Invalid project ID [{}]: must be 6-30 lowercase letters, digits or hyphens, starting with a letter",
                project
            );
            self.console
                .warning(&messages::project_creation_failed(project, &reason))?;
            return Ok(None);
        }

        match self.resource_manager.create_project(project).await {
            Ok(created) => {
                info!(project = %created.project_id, "Project created");
                Ok(Some(created.project_id))
            }
            Err(
                e @ (ResourceManagerError::OperationFailed { .. }
                | ResourceManagerError::OperationTimeout { .. }),
            ) => {
                warn!(project, error = %e, "Project creation operation failed");
                self.console
                    .warning(&messages::project_operation_failed(project, &e.to_string()))?;
                Ok(None)
            }
            Err(e) => {
                warn!(project, error = %e, already_exists = e.is_already_exists(), "Project creation failed");
                self.console
                    .warning(&messages::project_creation_failed(project, &e.to_string()))?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::TranscriptBuffer;
    use crate::external::resource_manager::{MockResourceManager, Project};
    use mockall::predicate::*;

    fn projects(ids: &[&str]) -> Vec<Project> {
        ids.iter().map(|id| Project::new(*id)).collect()
    }

    #[tokio::test]
    async fn test_preselected_listed_project_is_silent() {
        let mut rm = MockResourceManager::new();
        rm.expect_list_projects()
            .with(eq(Some(201)))
            .times(1)
            .returning(|_| Ok(projects(&["golden-project", "old-project"])));
        rm.expect_create_project().never();

        let transcript = TranscriptBuffer::new();
        let mut console = Console::scripted("", transcript.clone());
        let picked = ProjectPicker::new(&mut console, &rm)
            .pick(Some("golden-project"))
            .await
            .unwrap();

        assert_eq!(picked.as_deref(), Some("golden-project"));
        assert_eq!(transcript.contents(), "");
    }

    #[tokio::test]
    async fn test_preselected_unknown_project_is_created() {
        let mut rm = MockResourceManager::new();
        rm.expect_list_projects()
            .returning(|_| Ok(projects(&["old-project", "golden-project"])));
        rm.expect_create_project()
            .with(eq("unknown-project"))
            .times(1)
            .returning(|id| Ok(Project::new(id)));

        let transcript = TranscriptBuffer::new();
        let mut console = Console::scripted("Y\n", transcript.clone());
        let picked = ProjectPicker::new(&mut console, &rm)
            .pick(Some("unknown-project"))
            .await
            .unwrap();

        assert_eq!(picked.as_deref(), Some("unknown-project"));
        assert_eq!(
            transcript.contents(),
            "{\"ux\": \"PROMPT_CONTINUE\", \"message\": \"[unknown-project] is not one of your projects [golden-project,old-project]. \", \"prompt_string\": \"Would you like to create it?\"}\n"
        );
    }

    #[tokio::test]
    async fn test_choice_by_text_and_create_entry() {
        let mut rm = MockResourceManager::new();
        rm.expect_list_projects()
            .returning(|_| Ok(projects(&["other-project"])));
        rm.expect_create_project()
            .with(eq("golden-project"))
            .times(1)
            .returning(|id| Ok(Project::new(id)));

        let transcript = TranscriptBuffer::new();
        let mut console = Console::scripted("2\ngolden-project\n", transcript.clone());
        let picked = ProjectPicker::new(&mut console, &rm).pick(None).await.unwrap();

        assert_eq!(picked.as_deref(), Some("golden-project"));
        assert!(transcript
            .contents()
            .contains("\"choices\": [\"other-project\", \"Create a new project\"]"));
    }

    #[tokio::test]
    async fn test_typo_cancels_without_create() {
        let mut rm = MockResourceManager::new();
        rm.expect_list_projects()
            .returning(|_| Ok(projects(&["your-project", "project2"])));
        rm.expect_create_project().never();

        let transcript = TranscriptBuffer::new();
        let mut console = Console::scripted("yuor-project\n", transcript);
        let picked = ProjectPicker::new(&mut console, &rm).pick(None).await.unwrap();

        assert!(picked.is_none());
    }

    #[tokio::test]
    async fn test_create_conflict_warns_and_gives_up() {
        let mut rm = MockResourceManager::new();
        rm.expect_list_projects().returning(|_| Ok(Vec::new()));
        rm.expect_create_project().times(1).returning(|_| {
            Err(ResourceManagerError::Http {
                status: 409,
                message: "Message.".to_string(),
            })
        });

        let transcript = TranscriptBuffer::new();
        let mut console = Console::scripted("\ntaken-project\n", transcript.clone());
        let picked = ProjectPicker::new(&mut console, &rm).pick(None).await.unwrap();

        assert!(picked.is_none());
        assert!(transcript.contents().ends_with(
            "WARNING: Project creation failed: HTTPError 409: Message.\n\
             Please make sure to create the project [taken-project] using\n\
             \x20   $ gcloud projects create taken-project\n\
             or change to another project using\n\
             \x20   $ gcloud config set project <PROJECT ID>\n"
        ));
    }

    #[tokio::test]
    async fn test_operation_failure_is_reported() {
        let mut rm = MockResourceManager::new();
        rm.expect_list_projects().returning(|_| Ok(Vec::new()));
        rm.expect_create_project().returning(|_| {
            Err(ResourceManagerError::OperationFailed {
                name: "pc.1234".to_string(),
                code: 7,
                message: "Something Bad Happened".to_string(),
            })
        });

        let transcript = TranscriptBuffer::new();
        let mut console = Console::scripted("Y\nqux-project\n", transcript.clone());
        let picked = ProjectPicker::new(&mut console, &rm).pick(None).await.unwrap();

        assert!(picked.is_none());
        assert!(transcript.contents().ends_with(
            "WARNING: Project creation for project [qux-project] failed:\n  Operation [pc.1234] failed: 7: Something Bad Happened\n"
        ));
    }

    #[tokio::test]
    async fn test_invalid_id_skips_rpc() {
        let mut rm = MockResourceManager::new();
        rm.expect_list_projects().returning(|_| Ok(Vec::new()));
        rm.expect_create_project().never();

        let transcript = TranscriptBuffer::new();
        let mut console = Console::scripted("Y\nBad_Id\n", transcript.clone());
        let picked = ProjectPicker::new(&mut console, &rm).pick(None).await.unwrap();

        assert!(picked.is_none());
        assert!(transcript.contents().contains("WARNING: Project creation failed: Invalid project ID [Bad_Id]"));
    }

    #[tokio::test]
    async fn test_listing_failure_allows_free_entry() {
        let mut rm = MockResourceManager::new();
        rm.expect_list_projects()
            .returning(|_| Err(ResourceManagerError::Transport("oops".to_string())));

        let transcript = TranscriptBuffer::new();
        let mut console = Console::scripted("some-project\n", transcript.clone());
        let picked = ProjectPicker::new(&mut console, &rm).pick(None).await.unwrap();

        assert_eq!(picked.as_deref(), Some("some-project"));
        assert_eq!(
            transcript.contents(),
            "WARNING: Listing available projects failed: oops\n\
             {\"ux\": \"PROMPT_RESPONSE\", \"message\": \"Enter project id you would like to use:  \"}"
        );
    }

    #[tokio::test]
    async fn test_large_account_enter_checks_activity() {
        let mut rm = MockResourceManager::new();
        rm.expect_list_projects()
            .with(eq(Some(3)))
            .returning(|_| Ok(projects(&["p-one-1", "p-two-2", "p-three-3"])));
        rm.expect_is_active()
            .with(eq("gone-project"))
            .returning(|_| Ok(false));
        rm.expect_is_active()
            .with(eq("live-project"))
            .returning(|_| Ok(true));

        let transcript = TranscriptBuffer::new();
        let mut console = Console::scripted("1\ngone-project\nlive-project\n", transcript.clone());
        let picked = ProjectPicker::new(&mut console, &rm)
            .with_list_limit(2)
            .pick(None)
            .await
            .unwrap();

        assert_eq!(picked.as_deref(), Some("live-project"));
        let out = transcript.contents();
        assert!(out.contains("This account has a lot of projects!"));
        assert!(out.contains("Project ID does not exist or is not active."));
    }

    #[tokio::test]
    async fn test_large_account_list_option_lists_everything() {
        let mut rm = MockResourceManager::new();
        rm.expect_list_projects()
            .with(eq(Some(2)))
            .times(1)
            .returning(|_| Ok(projects(&["p-one-1", "p-two-2"])));
        rm.expect_list_projects()
            .with(eq(None))
            .times(1)
            .returning(|_| Ok(projects(&["p-one-1", "p-two-2", "p-three-3"])));

        let transcript = TranscriptBuffer::new();
        let mut console = Console::scripted("3\np-three-3\n", transcript);
        let picked = ProjectPicker::new(&mut console, &rm)
            .with_list_limit(1)
            .pick(None)
            .await
            .unwrap();

        assert_eq!(picked.as_deref(), Some("p-three-3"));
    }

    #[test]
    fn test_project_id_rule() {
        assert!(is_valid_project_id("golden-project"));
        assert!(!is_valid_project_id("short"));
        assert!(!is_valid_project_id("1starts-with-digit"));
        assert!(!is_valid_project_id("ends-with-hyphen-"));
        assert!(!is_valid_project_id("a-project-id-that-is-far-too-long"));
    }
}
