use async_trait::async_trait;
use taskline_core::project::{CreateProject, Project, ProjectFilter, UpdateProject};
use taskline_core::task::{CreateTask, Task, TaskFilter, UpdateTask};
use taskline_core::{ProjectStatus, TaskStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("request failed: {0}")]
    Internal(String),
}

/// One method per (resource, verb) pair of the backend.
///
/// The TUI programs against this trait; `HttpClient` is the only
/// production implementation. No retry, no caching, no auth.
#[async_trait]
pub trait Api: Send + Sync {
    // -- Projects --
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, ApiError>;
    async fn create_project(&self, input: &CreateProject) -> Result<Project, ApiError>;
    async fn update_project(
        &self,
        id: i64,
        update: &UpdateProject,
    ) -> Result<Project, ApiError>;
    async fn delete_project(&self, id: i64) -> Result<(), ApiError>;
    async fn set_project_status(
        &self,
        id: i64,
        status: ProjectStatus,
    ) -> Result<Project, ApiError>;

    // -- Tasks --
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ApiError>;
    async fn create_task(&self, input: &CreateTask) -> Result<Task, ApiError>;
    async fn update_task(&self, id: i64, update: &UpdateTask) -> Result<Task, ApiError>;
    async fn delete_task(&self, id: i64) -> Result<(), ApiError>;
    async fn set_task_status(&self, id: i64, status: TaskStatus) -> Result<Task, ApiError>;
}
