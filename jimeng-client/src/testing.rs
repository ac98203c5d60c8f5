//! Test doubles: an in-process mock of the task API and a scripted client

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use jimeng_core::domain::generation::GenerationRequest;
use jimeng_core::domain::task::{Task, TaskContent, TaskStatus};
use serde_json::{Value, json};

use crate::error::{ClientError, Result};
use crate::generation::GenerationClient;

/// Build a task snapshot as the service would report it
pub(crate) fn task(id: &str, status: TaskStatus, video_url: &str) -> Task {
    Task {
        id: id.to_string(),
        model: None,
        status,
        content: (status == TaskStatus::Succeeded).then(|| TaskContent {
            video_url: video_url.to_string(),
        }),
        error: None,
        created_at: None,
        updated_at: None,
    }
}

// =============================================================================
// Mock HTTP service
// =============================================================================

#[derive(Debug, Clone)]
pub(crate) struct RecordedCreate {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct MockState {
    created: Vec<RecordedCreate>,
    statuses: HashMap<String, VecDeque<TaskStatus>>,
}

type Shared = Arc<Mutex<MockState>>;

/// Task API served from a local port
pub(crate) struct MockArk {
    base_url: String,
    state: Shared,
}

impl MockArk {
    pub const VIDEO_URL: &'static str = "https://cdn.example.com/out.mp4";
    pub const REJECTED_KEY: &'static str = "revoked";

    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let router = Router::new()
            .route("/contents/generations/tasks", post(create_task))
            .route("/contents/generations/tasks/{id}", get(get_task))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Queue the next status reported for a task; the last one sticks
    pub fn push_status(&self, task_id: &str, status: TaskStatus) {
        self.state
            .lock()
            .unwrap()
            .statuses
            .entry(task_id.to_string())
            .or_default()
            .push_back(status);
    }

    pub fn created(&self) -> Vec<RecordedCreate> {
        self.state.lock().unwrap().created.clone()
    }
}

fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
        .into_response()
}

async fn create_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if authorization.as_deref() == Some(format!("Bearer {}", MockArk::REJECTED_KEY).as_str()) {
        return error_body(StatusCode::UNAUTHORIZED, "AuthenticationError", "invalid api key");
    }

    let mut state = state.lock().unwrap();
    state.created.push(RecordedCreate {
        authorization,
        body,
    });
    let id = format!("cgt-{:04}", state.created.len());

    Json(json!({ "id": id })).into_response()
}

async fn get_task(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    let Some(queue) = state.statuses.get_mut(&id) else {
        return error_body(StatusCode::NOT_FOUND, "NotFound", "task not found");
    };

    let status = if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().copied()
    }
    .unwrap_or(TaskStatus::Pending);

    Json(task(&id, status, MockArk::VIDEO_URL)).into_response()
}

// =============================================================================
// Scripted client
// =============================================================================

/// One scripted answer to a status query
#[derive(Debug, Clone, Copy)]
pub(crate) enum Step {
    Status(TaskStatus),
    /// `succeeded` with no content
    SucceededWithoutVideo,
    Fault,
}

/// Answers status queries from a script, then reports `pending` forever
pub(crate) struct ScriptedClient {
    script: Mutex<VecDeque<Step>>,
    polls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            polls: AtomicUsize::new(0),
        }
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn submit(&self, _request: &GenerationRequest) -> Result<String> {
        Ok("cgt-scripted".to_string())
    }

    async fn poll(&self, task_id: &str) -> Result<Task> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Step::Status(TaskStatus::Pending));

        match step {
            Step::Status(status) => Ok(task(task_id, status, MockArk::VIDEO_URL)),
            Step::SucceededWithoutVideo => Ok(Task {
                content: None,
                ..task(task_id, TaskStatus::Succeeded, MockArk::VIDEO_URL)
            }),
            Step::Fault => Err(ClientError::api_error(502, "bad gateway")),
        }
    }
}
