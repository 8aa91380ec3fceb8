//! In-process stub of the project management backend.
//!
//! Records every request line (`METHOD uri`) and every JSON body, and
//! answers with the documented response shapes. Entity ids in the 400/500
//! range trigger canned error responses so error mapping can be tested.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Default)]
pub struct Recorded {
    pub log: Vec<String>,
    pub bodies: Vec<Value>,
}

pub type Shared = Arc<Mutex<Recorded>>;

pub struct StubServer {
    pub base_url: String,
    state: Shared,
}

impl StubServer {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(Recorded::default()));

        let app = Router::new()
            .route("/api/v1/projects", get(list_projects))
            .route("/api/v1/projects/", post(create_project))
            .route("/api/v1/projects/{id}", put(update_project))
            .route("/api/v1/projects/{id}", delete(delete_project))
            .route("/api/v1/projects/{id}/status", patch(project_status))
            .route("/api/v1/tasks", get(list_tasks))
            .route("/api/v1/tasks/", post(create_task))
            .route("/api/v1/tasks/{id}", put(update_task))
            .route("/api/v1/tasks/{id}", delete(delete_task))
            .route("/api/v1/tasks/{id}/status", patch(task_status))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn log(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.state.lock().unwrap().bodies.clone()
    }
}

async fn record(State(state): State<Shared>, req: Request, next: Next) -> Response {
    state
        .lock()
        .unwrap()
        .log
        .push(format!("{} {}", req.method(), req.uri()));
    next.run(req).await
}

fn sample_project(id: i64) -> Value {
    json!({
        "id": id,
        "name": "Apollo",
        "description": "Launch prep",
        "start_date": null,
        "end_date": null,
        "status": "active",
        "statistics": {
            "total_tasks": 3,
            "completed_tasks": 1,
            "pending_tasks": 2,
            "overdue_tasks": 0,
            "completion_rate": 33.3
        },
        "created_at": "2024-01-01T09:00:00",
        "updated_at": null
    })
}

fn sample_task(id: i64) -> Value {
    json!({
        "id": id,
        "project_id": 1,
        "title": "Fuel check",
        "description": null,
        "assignee": "ana",
        "start_date": "2024-01-01",
        "end_date": "2024-01-05",
        "priority": 2,
        "status": "pending",
        "is_overdue": false,
        "days_remaining": 4,
        "created_at": "2024-01-01T09:00:00",
        "updated_at": null
    })
}

fn error_for(id: i64) -> Option<Response> {
    match id {
        404 => Some(
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": format!("Entity {id} not found") })),
            )
                .into_response(),
        ),
        422 => Some(
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "detail": [{ "loc": ["body", "name"], "msg": "field required" }]
                })),
            )
                .into_response(),
        ),
        500 => Some(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "boom" })),
            )
                .into_response(),
        ),
        _ => None,
    }
}

async fn list_projects() -> Json<Value> {
    Json(json!({
        "items": [sample_project(1)],
        "total": 1,
        "page": 1,
        "page_size": 10,
        "total_pages": 1
    }))
}

async fn create_project(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    state.lock().unwrap().bodies.push(body.clone());
    let mut project = sample_project(101);
    project["name"] = body["name"].clone();
    project["status"] = body["status"].clone();
    Json(project)
}

async fn update_project(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    state.lock().unwrap().bodies.push(body.clone());
    if let Some(err) = error_for(id) {
        return err;
    }
    let mut project = sample_project(id);
    if body["name"].is_string() {
        project["name"] = body["name"].clone();
    }
    Json(project).into_response()
}

async fn delete_project(Path(id): Path<i64>) -> Response {
    if let Some(err) = error_for(id) {
        return err;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn project_status(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    state.lock().unwrap().bodies.push(body.clone());
    if let Some(err) = error_for(id) {
        return err;
    }
    let mut project = sample_project(id);
    project["status"] = body["status"].clone();
    Json(project).into_response()
}

async fn list_tasks() -> Json<Value> {
    Json(json!({
        "tasks": [sample_task(9)],
        "total": 1,
        "page": 1,
        "page_size": 10,
        "total_pages": 1
    }))
}

async fn create_task(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    state.lock().unwrap().bodies.push(body.clone());
    let mut task = sample_task(201);
    for key in ["title", "assignee", "project_id", "priority", "start_date", "end_date"] {
        if !body[key].is_null() {
            task[key] = body[key].clone();
        }
    }
    Json(task)
}

async fn update_task(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    state.lock().unwrap().bodies.push(body.clone());
    if let Some(err) = error_for(id) {
        return err;
    }
    Json(sample_task(id)).into_response()
}

async fn delete_task(Path(id): Path<i64>) -> Response {
    if let Some(err) = error_for(id) {
        return err;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn task_status(
    Path(id): Path<i64>,
    axum::extract::Query(params): axum::extract::Query<std::collections::HashMap<String, String>>,
) -> Response {
    if let Some(err) = error_for(id) {
        return err;
    }
    let mut task = sample_task(id);
    if let Some(status) = params.get("status") {
        task["status"] = json!(status);
    }
    Json(task).into_response()
}
