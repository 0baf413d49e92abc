use super::HookError;
use super::resource::{Mutation, ResourceHook};
use crate::entities::{EntityId, Role, User};
use crate::resource::Resource;
use serde_json::json;

impl ResourceHook<User> {
    /// `PUT /users/:id/role`
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self, role), fields(role = %role))]
    pub async fn set_role(&self, id: &EntityId, role: Role) -> Result<Option<User>, HookError> {
        let body = json!({ "role": role });
        self.mutate(
            Mutation::Update,
            self.ctx.client.put(&format!("{}/role", User::item_path(id)?), &body),
            format!("{} updated successfully", User::LABEL),
        )
        .await
    }
}
