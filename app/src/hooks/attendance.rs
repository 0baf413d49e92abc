use super::HookError;
use super::resource::{Mutation, ResourceHook};
use crate::entities::{Attendance, AttendanceSummary};
use crate::resource::Resource;
use serde_json::json;

impl ResourceHook<Attendance> {
    /// `GET /attendance/me`: the signed-in employee's records
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_mine(&self) -> Result<bool, HookError> {
        self.fetch_list(&format!("{}/me", Attendance::PATH)).await
    }

    /// `POST /attendance/check-in`: open today's record
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self))]
    pub async fn check_in(&self) -> Result<Option<Attendance>, HookError> {
        self.mutate(
            Mutation::Create,
            self.ctx.client.post(&format!("{}/check-in", Attendance::PATH), &json!({})),
            "Checked in successfully".to_string(),
        )
        .await
    }

    /// `PUT /attendance/check-out`: close today's record
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self))]
    pub async fn check_out(&self) -> Result<Option<Attendance>, HookError> {
        self.mutate(
            Mutation::Update,
            self.ctx.client.put(&format!("{}/check-out", Attendance::PATH), &json!({})),
            "Checked out successfully".to_string(),
        )
        .await
    }

    /// Summary of the cached records
    pub async fn summary(&self) -> AttendanceSummary {
        self.ctx
            .store
            .state(|s| AttendanceSummary::tally(&s.attendance.items))
            .await
    }
}
