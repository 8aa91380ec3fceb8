use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use taskline_core::project::{CreateProject, Project, ProjectFilter, UpdateProject};
use taskline_core::project::ProjectPage;
use taskline_core::task::{CreateTask, Task, TaskFilter, TaskPage, UpdateTask};
use taskline_core::{ProjectStatus, TaskStatus};
use tracing::debug;

use crate::{Api, ApiError};

const API_BASE: &str = "/api/v1";

/// Async HTTP implementation of `Api`.
/// Talks to the project management backend at `{base_url}/api/v1`.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_BASE}{path}", self.base_url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path, "POST");
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn put_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path, "PUT");
        let resp = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn patch_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path, "PATCH");
        let resp = self
            .client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    /// PATCH with no request body (the task status endpoint takes its
    /// value as a query parameter).
    async fn patch_empty<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "PATCH");
        let resp = self
            .client
            .patch(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn delete_req(&self, path: &str) -> Result<(), ApiError> {
        debug!(path, "DELETE");
        let resp = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ApiError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: reqwest::Response) -> ApiError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

/// Backend errors are FastAPI-shaped: `{"detail": "..."}`.
/// Validation failures (422) carry a structured `detail` array, which is
/// passed through as its JSON text.
async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ApiError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .map(|v| match &v["detail"] {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => body.clone(),
            other => other.to_string(),
        })
        .unwrap_or(body);

    if status == StatusCode::NOT_FOUND {
        ApiError::NotFound(msg)
    } else if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
        ApiError::InvalidInput(msg)
    } else {
        ApiError::Internal(msg)
    }
}

#[async_trait]
impl Api for HttpClient {
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, ApiError> {
        let mut params = Vec::new();
        if let Some(status) = filter.status {
            params.push(format!("status={}", status.as_str()));
        }
        if let Some(page) = filter.page {
            params.push(format!("page={page}"));
        }
        if let Some(size) = filter.page_size {
            params.push(format!("page_size={size}"));
        }
        let qs = if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        };
        let page: ProjectPage = self.get_json(&format!("/projects{qs}")).await?;
        Ok(page.items)
    }

    async fn create_project(&self, input: &CreateProject) -> Result<Project, ApiError> {
        // Trailing slash matters to the backend router.
        self.post_json("/projects/", input).await
    }

    async fn update_project(
        &self,
        id: i64,
        update: &UpdateProject,
    ) -> Result<Project, ApiError> {
        self.put_json(&format!("/projects/{id}"), update).await
    }

    async fn delete_project(&self, id: i64) -> Result<(), ApiError> {
        self.delete_req(&format!("/projects/{id}")).await
    }

    async fn set_project_status(
        &self,
        id: i64,
        status: ProjectStatus,
    ) -> Result<Project, ApiError> {
        self.patch_json(
            &format!("/projects/{id}/status"),
            &serde_json::json!({ "status": status.as_str() }),
        )
        .await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ApiError> {
        let mut params = Vec::new();
        if let Some(pid) = filter.project_id {
            params.push(format!("project_id={pid}"));
        }
        if let Some(status) = filter.status {
            params.push(format!("status={}", status.as_str()));
        }
        if let Some(ref assignee) = filter.assignee {
            params.push(format!("assignee={assignee}"));
        }
        let qs = if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        };
        let page: TaskPage = self.get_json(&format!("/tasks{qs}")).await?;
        Ok(page.tasks)
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ApiError> {
        self.post_json("/tasks/", input).await
    }

    async fn update_task(&self, id: i64, update: &UpdateTask) -> Result<Task, ApiError> {
        self.put_json(&format!("/tasks/{id}"), update).await
    }

    async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        self.delete_req(&format!("/tasks/{id}")).await
    }

    async fn set_task_status(&self, id: i64, status: TaskStatus) -> Result<Task, ApiError> {
        // Unlike the project endpoint, status travels as a query param.
        self.patch_empty(&format!("/tasks/{id}/status?status={}", status.as_str()))
            .await
    }
}
