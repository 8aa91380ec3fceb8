//! Stateful in-process stub of the project management backend for
//! driving the App end to end.
//!
//! The store holds raw JSON entities so handlers can merge partial
//! updates without caring about the full schema. Every request line is
//! recorded, and `set_fail` makes the whole backend answer 500 so error
//! paths can be exercised.
//!
//! The server runs on its own thread with its own runtime: the blocking
//! client owns a runtime of its own, and nesting the two panics.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Default)]
pub struct Store {
    pub log: Vec<String>,
    pub bodies: Vec<Value>,
    pub projects: Vec<Value>,
    pub tasks: Vec<Value>,
    pub next_id: i64,
    pub fail_all: bool,
}

pub type SharedStore = Arc<Mutex<Store>>;

pub struct TestServer {
    pub base_url: String,
    store: SharedStore,
}

impl TestServer {
    pub fn spawn() -> Self {
        let store: SharedStore = Arc::new(Mutex::new(Store {
            next_id: 100,
            ..Store::default()
        }));
        let server_store = store.clone();

        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let app = router(server_store);
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                let addr = listener.local_addr().unwrap();
                tx.send(format!("http://{addr}")).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });

        Self {
            base_url: rx.recv().unwrap(),
            store,
        }
    }

    pub fn seed_project(&self, id: i64, name: &str) {
        self.store.lock().unwrap().projects.push(json!({
            "id": id,
            "name": name,
            "description": null,
            "start_date": null,
            "end_date": null,
            "status": "active",
            "statistics": null,
            "created_at": "2024-01-01T09:00:00",
            "updated_at": null
        }));
    }

    pub fn seed_task(&self, id: i64, project_id: i64, title: &str) {
        self.store.lock().unwrap().tasks.push(json!({
            "id": id,
            "project_id": project_id,
            "title": title,
            "description": null,
            "assignee": "ana",
            "start_date": "2024-01-01",
            "end_date": "2024-01-05",
            "priority": 3,
            "status": "pending",
            "is_overdue": false,
            "days_remaining": 4,
            "created_at": "2024-01-01T09:00:00",
            "updated_at": null
        }));
    }

    pub fn log(&self) -> Vec<String> {
        self.store.lock().unwrap().log.clone()
    }

    pub fn clear_log(&self) {
        let mut store = self.store.lock().unwrap();
        store.log.clear();
        store.bodies.clear();
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.store.lock().unwrap().bodies.clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.store.lock().unwrap().fail_all = fail;
    }
}

fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/api/v1/projects", get(list_projects))
        .route("/api/v1/projects/", post(create_project))
        .route("/api/v1/projects/{id}", put(update_project))
        .route("/api/v1/projects/{id}", delete(delete_project))
        .route("/api/v1/tasks", get(list_tasks))
        .route("/api/v1/tasks/", post(create_task))
        .route("/api/v1/tasks/{id}", put(update_task))
        .route("/api/v1/tasks/{id}", delete(delete_task))
        .route("/api/v1/tasks/{id}/status", patch(task_status))
        .layer(middleware::from_fn_with_state(store.clone(), record))
        .with_state(store)
}

async fn record(State(store): State<SharedStore>, req: Request, next: Next) -> Response {
    {
        let mut store = store.lock().unwrap();
        store.log.push(format!("{} {}", req.method(), req.uri()));
        if store.fail_all {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "backend unavailable" })),
            )
                .into_response();
        }
    }
    next.run(req).await
}

async fn list_projects(State(store): State<SharedStore>) -> Json<Value> {
    let projects = store.lock().unwrap().projects.clone();
    Json(json!({
        "items": projects,
        "total": projects.len(),
        "page": 1,
        "page_size": 10,
        "total_pages": 1
    }))
}

async fn create_project(State(store): State<SharedStore>, Json(body): Json<Value>) -> Json<Value> {
    let mut store = store.lock().unwrap();
    store.bodies.push(body.clone());
    let id = store.next_id;
    store.next_id += 1;
    let mut project = json!({
        "id": id,
        "name": "",
        "description": null,
        "start_date": null,
        "end_date": null,
        "status": "planning",
        "statistics": null,
        "created_at": "2024-01-01T09:00:00",
        "updated_at": null
    });
    merge(&mut project, &body);
    store.projects.push(project.clone());
    Json(project)
}

async fn update_project(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut store = store.lock().unwrap();
    store.bodies.push(body.clone());
    match store.projects.iter_mut().find(|p| p["id"] == json!(id)) {
        Some(project) => {
            merge(project, &body);
            Json(project.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn delete_project(State(store): State<SharedStore>, Path(id): Path<i64>) -> Response {
    let mut store = store.lock().unwrap();
    let before = store.projects.len();
    store.projects.retain(|p| p["id"] != json!(id));
    if store.projects.len() == before {
        return not_found();
    }
    store.tasks.retain(|t| t["project_id"] != json!(id));
    StatusCode::NO_CONTENT.into_response()
}

async fn list_tasks(
    State(store): State<SharedStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let tasks: Vec<Value> = store
        .lock()
        .unwrap()
        .tasks
        .iter()
        .filter(|t| match params.get("project_id") {
            Some(pid) => t["project_id"].to_string() == *pid,
            None => true,
        })
        .cloned()
        .collect();
    Json(json!({
        "tasks": tasks,
        "total": tasks.len(),
        "page": 1,
        "page_size": 10,
        "total_pages": 1
    }))
}

async fn create_task(State(store): State<SharedStore>, Json(body): Json<Value>) -> Json<Value> {
    let mut store = store.lock().unwrap();
    store.bodies.push(body.clone());
    let id = store.next_id;
    store.next_id += 1;
    let mut task = json!({
        "id": id,
        "project_id": 0,
        "title": "",
        "description": null,
        "assignee": "",
        "start_date": "2024-01-01",
        "end_date": "2024-01-05",
        "priority": 3,
        "status": "pending",
        "is_overdue": false,
        "days_remaining": null,
        "created_at": "2024-01-01T09:00:00",
        "updated_at": null
    });
    merge(&mut task, &body);
    store.tasks.push(task.clone());
    Json(task)
}

async fn update_task(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut store = store.lock().unwrap();
    store.bodies.push(body.clone());
    match store.tasks.iter_mut().find(|t| t["id"] == json!(id)) {
        Some(task) => {
            merge(task, &body);
            Json(task.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn delete_task(State(store): State<SharedStore>, Path(id): Path<i64>) -> Response {
    let mut store = store.lock().unwrap();
    let before = store.tasks.len();
    store.tasks.retain(|t| t["id"] != json!(id));
    if store.tasks.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn task_status(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut store = store.lock().unwrap();
    match store.tasks.iter_mut().find(|t| t["id"] == json!(id)) {
        Some(task) => {
            if let Some(status) = params.get("status") {
                task["status"] = json!(status);
            }
            Json(task.clone()).into_response()
        }
        None => not_found(),
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": "not found" })),
    )
        .into_response()
}

/// Overlay non-null fields of `body` onto the stored entity.
fn merge(entity: &mut Value, body: &Value) {
    if let (Some(entity), Some(body)) = (entity.as_object_mut(), body.as_object()) {
        for (key, value) in body {
            if !value.is_null() {
                entity.insert(key.clone(), value.clone());
            }
        }
    }
}
