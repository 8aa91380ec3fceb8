use taskline_core::project::{CreateProject, Project, ProjectFilter, UpdateProject};
use taskline_core::task::{CreateTask, Task, TaskFilter, UpdateTask};
use taskline_core::{ProjectStatus, TaskStatus};
use tokio::runtime::Runtime;

use crate::{Api, ApiError, HttpClient};

/// Blocking wrapper around the async `HttpClient`.
///
/// Creates an internal tokio runtime and uses `block_on()` for each call.
/// Designed for sync callers like the TUI; every request runs to
/// completion before the next one starts, so calls are strictly ordered.
pub struct BlockingClient {
    inner: HttpClient,
    rt: Runtime,
}

impl BlockingClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: HttpClient::new(base_url),
            rt: Runtime::new().expect("failed to create tokio runtime"),
        }
    }

    // -- Projects --

    pub fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, ApiError> {
        self.rt.block_on(self.inner.list_projects(filter))
    }

    pub fn create_project(&self, input: &CreateProject) -> Result<Project, ApiError> {
        self.rt.block_on(self.inner.create_project(input))
    }

    pub fn update_project(&self, id: i64, update: &UpdateProject) -> Result<Project, ApiError> {
        self.rt.block_on(self.inner.update_project(id, update))
    }

    pub fn delete_project(&self, id: i64) -> Result<(), ApiError> {
        self.rt.block_on(self.inner.delete_project(id))
    }

    pub fn set_project_status(
        &self,
        id: i64,
        status: ProjectStatus,
    ) -> Result<Project, ApiError> {
        self.rt.block_on(self.inner.set_project_status(id, status))
    }

    // -- Tasks --

    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ApiError> {
        self.rt.block_on(self.inner.list_tasks(filter))
    }

    pub fn create_task(&self, input: &CreateTask) -> Result<Task, ApiError> {
        self.rt.block_on(self.inner.create_task(input))
    }

    pub fn update_task(&self, id: i64, update: &UpdateTask) -> Result<Task, ApiError> {
        self.rt.block_on(self.inner.update_task(id, update))
    }

    pub fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        self.rt.block_on(self.inner.delete_task(id))
    }

    pub fn set_task_status(&self, id: i64, status: TaskStatus) -> Result<Task, ApiError> {
        self.rt.block_on(self.inner.set_task_status(id, status))
    }
}
