//! Test double for the generation service

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use jimeng_client::{ClientError, GenerationClient};
use jimeng_core::domain::generation::GenerationRequest;
use jimeng_core::domain::task::{Task, TaskContent, TaskStatus};

pub(crate) const VIDEO_URL: &str = "https://cdn.example.com/generated.mp4";

/// Records submissions and reports scripted statuses, then `running` forever
pub(crate) struct FakeClient {
    reject_submit: bool,
    statuses: Mutex<VecDeque<TaskStatus>>,
    submitted: Mutex<Vec<GenerationRequest>>,
}

impl FakeClient {
    pub fn new(statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        Self {
            reject_submit: false,
            statuses: Mutex::new(statuses.into_iter().collect()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject_submit: true,
            ..Self::new([])
        }
    }

    pub fn submitted(&self) -> Vec<GenerationRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for FakeClient {
    async fn submit(&self, request: &GenerationRequest) -> jimeng_client::Result<String> {
        if self.reject_submit {
            return Err(ClientError::api_error(401, "AuthenticationError: invalid api key"));
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(request.clone());
        Ok(format!("cgt-{}", submitted.len()))
    }

    async fn poll(&self, task_id: &str) -> jimeng_client::Result<Task> {
        let status = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(TaskStatus::Running);

        Ok(Task {
            id: task_id.to_string(),
            model: None,
            status,
            content: (status == TaskStatus::Succeeded).then(|| TaskContent {
                video_url: VIDEO_URL.to_string(),
            }),
            error: None,
            created_at: None,
            updated_at: None,
        })
    }
}
