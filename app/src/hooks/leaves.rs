use super::HookError;
use super::resource::{Mutation, ResourceHook};
use crate::entities::{EntityId, Leave, LeaveCounts, LeaveStatus};
use crate::resource::Resource;
use serde_json::json;
use staffdesk_core::slice::SliceAction;

impl ResourceHook<Leave> {
    /// `GET /leave/employee`: the signed-in employee's requests
    ///
    /// Returns the tab counts, taken from the response when the server
    /// sends them and tallied from the list otherwise. `None` on failure.
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_mine(&self) -> Result<Option<LeaveCounts>, HookError> {
        let Some(envelope) = self
            .request(
                SliceAction::FetchStart,
                self.ctx.client.get(&format!("{}/employee", Leave::PATH)),
                SliceAction::FetchFailure,
            )
            .await?
        else {
            return Ok(None);
        };

        if !self.settle_list(&envelope).await? {
            return Ok(None);
        }

        let counts = match envelope.take_optional::<LeaveCounts>("counts") {
            Ok(Some(counts)) => counts,
            Ok(None) => self.counts().await,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed leave counts");
                self.counts().await
            },
        };
        Ok(Some(counts))
    }

    /// `PUT /leave/:id/status`
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self, status), fields(status = %status))]
    pub async fn set_status(&self, id: &EntityId, status: LeaveStatus) -> Result<Option<Leave>, HookError> {
        let body = json!({ "status": status });
        self.mutate(
            Mutation::Update,
            self.ctx.client.put(&format!("{}/status", Leave::item_path(id)?), &body),
            format!("{} {} successfully", Leave::LABEL, status.as_str().to_lowercase()),
        )
        .await
    }

    /// Approve a pending request
    ///
    /// # Errors
    ///
    /// See [`ResourceHook::set_status`](Self::set_status).
    pub async fn approve(&self, id: &EntityId) -> Result<Option<Leave>, HookError> {
        self.set_status(id, LeaveStatus::Approved).await
    }

    /// Reject a pending request
    ///
    /// # Errors
    ///
    /// See [`ResourceHook::set_status`](Self::set_status).
    pub async fn reject(&self, id: &EntityId) -> Result<Option<Leave>, HookError> {
        self.set_status(id, LeaveStatus::Rejected).await
    }

    /// Tab counts of the cached requests
    pub async fn counts(&self) -> LeaveCounts {
        self.ctx.store.state(|s| LeaveCounts::tally(&s.leaves.items)).await
    }
}
