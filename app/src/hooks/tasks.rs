use super::HookError;
use super::resource::{Mutation, ResourceHook};
use crate::entities::{EntityId, Task, TaskCounts, TaskStatus};
use crate::resource::Resource;
use serde_json::json;

impl ResourceHook<Task> {
    /// `GET /tasks/assigned`: tasks assigned to the signed-in user
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_assigned(&self) -> Result<bool, HookError> {
        self.fetch_list(&format!("{}/assigned", Task::PATH)).await
    }

    /// Move a task to `status`
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self, status), fields(status = %status))]
    pub async fn set_status(&self, id: &EntityId, status: TaskStatus) -> Result<Option<Task>, HookError> {
        let body = json!({ "status": status });
        self.mutate(
            Mutation::Update,
            self.ctx.client.put(&Task::item_path(id)?, &body),
            format!("{} updated successfully", Task::LABEL),
        )
        .await
    }

    /// Per-status counts of the cached tasks
    pub async fn counts(&self) -> TaskCounts {
        self.ctx.store.state(|s| TaskCounts::tally(&s.tasks.items)).await
    }
}
