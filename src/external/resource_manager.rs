//! Resource manager client
//!
//! Lists, creates and looks up projects through the Cloud Resource Manager v1
//! REST API. Project creation returns a long-running operation which is polled
//! until it completes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::command::CommandExecutor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
}

impl Project {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            lifecycle_state: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle_state.as_deref().unwrap_or("ACTIVE") == "ACTIVE"
    }
}

#[derive(Debug, Error)]
pub enum ResourceManagerError {
    #[error("HTTPError {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Operation [{name}] failed: {code}: {message}")]
    OperationFailed {
        name: String,
        code: i64,
        message: String,
    },
    #[error("Operation [{name}] did not complete after {polls} checks")]
    OperationTimeout { name: String, polls: u32 },
    #[error("Could not obtain an access token: {0}")]
    Auth(String),
    #[error("{0}")]
    Transport(String),
}

impl ResourceManagerError {
    /// The server rejected a create because the project id is taken.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ResourceManagerError::Http { status: 409, .. })
    }
}

impl From<reqwest::Error> for ResourceManagerError {
    fn from(err: reqwest::Error) -> Self {
        ResourceManagerError::Transport(err.to_string())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// Active projects visible to the account, at most `limit` when given.
    async fn list_projects(&self, limit: Option<usize>) -> Result<Vec<Project>, ResourceManagerError>;

    /// Create a project and wait for the operation to finish.
    async fn create_project(&self, project_id: &str) -> Result<Project, ResourceManagerError>;

    /// Whether `project_id` exists and is in the ACTIVE lifecycle state.
    async fn is_active(&self, project_id: &str) -> Result<bool, ResourceManagerError>;
}

#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, ResourceManagerError>;
}

/// Access tokens printed by `<cli> auth print-access-token`.
pub struct CliAccessToken {
    program: String,
    executor: Arc<dyn CommandExecutor>,
}

impl CliAccessToken {
    pub fn new(program: impl Into<String>, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            program: program.into(),
            executor,
        }
    }
}

#[async_trait]
impl AccessTokenSource for CliAccessToken {
    async fn access_token(&self) -> Result<String, ResourceManagerError> {
        let args = vec!["auth".to_string(), "print-access-token".to_string()];
        let output = self
            .executor
            .execute(&self.program, &args)
            .await
            .map_err(|e| ResourceManagerError::Auth(e.to_string()))?;
        let token = output.stdout.trim();
        if !output.success() || token.is_empty() {
            return Err(ResourceManagerError::Auth(format!(
                "[{} auth print-access-token] exited with code [{}]",
                self.program, output.status_code
            )));
        }
        Ok(token.to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListProjectsResponse {
    #[serde(default)]
    projects: Vec<Project>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<OperationStatus>,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

const PAGE_SIZE: usize = 500;

/// [`ResourceManager`] over the v1 REST API.
pub struct RestResourceManager {
    client: reqwest::Client,
    endpoint: String,
    tokens: Arc<dyn AccessTokenSource>,
    poll_interval: Duration,
    max_polls: u32,
}

impl RestResourceManager {
    pub fn new(endpoint: impl Into<String>, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            tokens,
            poll_interval: Duration::from_secs(1),
            max_polls: 60,
        }
    }

    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ResourceManagerError> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);
        Err(ResourceManagerError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn wait_for(&self, mut operation: Operation) -> Result<Operation, ResourceManagerError> {
        let mut polls = 0;
        while !operation.done {
            if polls >= self.max_polls {
                return Err(ResourceManagerError::OperationTimeout {
                    name: short_operation_name(&operation.name),
                    polls,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
            polls += 1;
            let url = format!("{}/v1/{}", self.endpoint, operation.name);
            operation = self.send(self.client.get(&url)).await?.json().await?;
        }
        Ok(operation)
    }
}

fn short_operation_name(name: &str) -> String {
    name.trim_start_matches("operations/").to_string()
}

#[async_trait]
impl ResourceManager for RestResourceManager {
    async fn list_projects(&self, limit: Option<usize>) -> Result<Vec<Project>, ResourceManagerError> {
        let url = format!("{}/v1/projects", self.endpoint);
        let mut projects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page_size = limit.map_or(PAGE_SIZE, |l| {
                l.saturating_sub(projects.len()).clamp(1, PAGE_SIZE)
            });
            let mut query = vec![
                ("filter", "lifecycleState:ACTIVE".to_string()),
                ("pageSize", page_size.to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let page: ListProjectsResponse = self
                .send(self.client.get(&url).query(&query))
                .await?
                .json()
                .await?;
            projects.extend(page.projects);

            if let Some(limit) = limit {
                if projects.len() >= limit {
                    projects.truncate(limit);
                    break;
                }
            }
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = projects.len(), "Listed projects");
        Ok(projects)
    }

    async fn create_project(&self, project_id: &str) -> Result<Project, ResourceManagerError> {
        let url = format!("{}/v1/projects", self.endpoint);
        let body = Project::new(project_id);
        let operation: Operation = self
            .send(self.client.post(&url).json(&body))
            .await?
            .json()
            .await?;

        let operation = self.wait_for(operation).await?;
        if let Some(status) = operation.error {
            return Err(ResourceManagerError::OperationFailed {
                name: short_operation_name(&operation.name),
                code: status.code,
                message: status.message,
            });
        }

        info!(project_id, "Created project");
        Ok(body)
    }

    async fn is_active(&self, project_id: &str) -> Result<bool, ResourceManagerError> {
        let url = format!("{}/v1/projects/{}", self.endpoint, project_id);
        match self.send(self.client.get(&url)).await {
            Ok(response) => Ok(response.json::<Project>().await?.is_active()),
            Err(ResourceManagerError::Http { status, .. })
                if status == StatusCode::FORBIDDEN.as_u16()
                    || status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_matches_cli_wording() {
        let conflict = ResourceManagerError::Http {
            status: 409,
            message: "Message.".to_string(),
        };
        assert_eq!(conflict.to_string(), "HTTPError 409: Message.");
        assert!(conflict.is_already_exists());

        let failed = ResourceManagerError::OperationFailed {
            name: "pc.1234".to_string(),
            code: 7,
            message: "Something Bad Happened".to_string(),
        };
        assert_eq!(
            failed.to_string(),
            "Operation [pc.1234] failed: 7: Something Bad Happened"
        );
        assert!(!failed.is_already_exists());
    }

    #[test]
    fn test_project_lifecycle() {
        assert!(Project::new("golden-project").is_active());
        let deleted: Project =
            serde_json::from_str(r#"{"projectId": "gone", "lifecycleState": "DELETE_REQUESTED"}"#)
                .unwrap();
        assert!(!deleted.is_active());
    }

    #[test]
    fn test_create_body_shape() {
        assert_eq!(
            serde_json::to_string(&Project::new("qux-project")).unwrap(),
            r#"{"projectId":"qux-project"}"#
        );
    }
}
