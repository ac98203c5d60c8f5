//! Submit/poll contract used by the node layer

use async_trait::async_trait;
use jimeng_core::domain::generation::GenerationRequest;
use jimeng_core::domain::task::Task;
use jimeng_core::dto::task::CreateTask;
use tracing::info;

use crate::ArkClient;
use crate::error::Result;

/// A service that accepts generation requests and reports task status
///
/// Implementations hold whatever authenticated transport they need; callers
/// only see task identifiers and task snapshots.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Submits a generation request
    ///
    /// # Returns
    /// The identifier of the created task
    async fn submit(&self, request: &GenerationRequest) -> Result<String>;

    /// Queries the current state of a task
    async fn poll(&self, task_id: &str) -> Result<Task>;
}

#[async_trait]
impl GenerationClient for ArkClient {
    async fn submit(&self, request: &GenerationRequest) -> Result<String> {
        let created = self.create_task(&CreateTask::from(request)).await?;
        info!("Created task {} (model {})", created.id, request.model());
        Ok(created.id)
    }

    async fn poll(&self, task_id: &str) -> Result<Task> {
        self.get_task(task_id).await
    }
}
