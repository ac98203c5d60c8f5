//! Task endpoints of the generation service

use jimeng_core::domain::task::Task;
use jimeng_core::dto::task::{CreateTask, TaskCreated};
use tracing::debug;

use crate::ArkClient;
use crate::error::{ClientError, Result};

impl ArkClient {
    // =============================================================================
    // Task Lifecycle
    // =============================================================================

    /// Create a new generation task
    ///
    /// # Arguments
    /// * `req` - The model and multimodal content of the task
    ///
    /// # Returns
    /// The identifier assigned by the service
    pub async fn create_task(&self, req: &CreateTask) -> Result<TaskCreated> {
        if req.content.is_empty() {
            return Err(ClientError::InvalidRequest(
                "task content must not be empty".to_string(),
            ));
        }

        let url = format!("{}/contents/generations/tasks", self.base_url);
        debug!("Creating task with model {}", req.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a task by ID
    ///
    /// # Arguments
    /// * `task_id` - The identifier returned by [`ArkClient::create_task`]
    ///
    /// # Returns
    /// The current task state
    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        let url = format!("{}/contents/generations/tasks/{}", self.base_url, task_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        self.handle_response(response).await.map_err(|e| {
            if e.is_not_found() {
                ClientError::NotFound(format!("task {}", task_id))
            } else {
                e
            }
        })
    }
}
