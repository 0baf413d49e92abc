//! REST resources and where their data lives in the store.

use crate::entities::{Attendance, Candidate, EntityId, Leave, Task, User};
use crate::state::{AppAction, AppState};
use serde::Serialize;
use serde::de::DeserializeOwned;
use staffdesk_client::ApiError;
use staffdesk_core::entity::Entity;
use staffdesk_core::slice::{SliceAction, SliceState};
use std::fmt;

/// A REST resource group backed by an entity slice.
///
/// Ties the wire layout (`PATH`, payload keys) to the slice in
/// [`AppState`] and the [`AppAction`] variant that reaches it.
pub trait Resource:
    Entity<Id = EntityId> + Serialize + DeserializeOwned + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// Collection path, e.g. `/tasks`
    const PATH: &'static str;
    /// Response key holding a list
    const LIST_KEY: &'static str;
    /// Response key holding a single record
    const ITEM_KEY: &'static str;
    /// Name used in notifications, e.g. `Task`
    const LABEL: &'static str;

    /// This resource's slice
    fn slice(state: &AppState) -> &SliceState<Self>;

    /// Wrap a slice action for dispatch
    fn action(action: SliceAction<Self>) -> AppAction;

    /// Path of one record; the id is encoded as a single segment
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an empty id or a dot
    /// segment, which URL normalization would resolve to another route.
    fn item_path(id: &EntityId) -> Result<String, ApiError> {
        let raw = id.as_str();
        if raw.is_empty() || raw == "." || raw == ".." {
            return Err(ApiError::InvalidRequest(format!("`{raw}` is not a record id")));
        }
        Ok(format!("{}/{}", Self::PATH, urlencoding::encode(raw)))
    }
}

impl Resource for Task {
    const PATH: &'static str = "/tasks";
    const LIST_KEY: &'static str = "tasks";
    const ITEM_KEY: &'static str = "task";
    const LABEL: &'static str = "Task";

    fn slice(state: &AppState) -> &SliceState<Self> {
        &state.tasks
    }

    fn action(action: SliceAction<Self>) -> AppAction {
        AppAction::Tasks(action)
    }
}

impl Resource for Leave {
    const PATH: &'static str = "/leave";
    const LIST_KEY: &'static str = "leaves";
    const ITEM_KEY: &'static str = "leave";
    const LABEL: &'static str = "Leave";

    fn slice(state: &AppState) -> &SliceState<Self> {
        &state.leaves
    }

    fn action(action: SliceAction<Self>) -> AppAction {
        AppAction::Leaves(action)
    }
}

impl Resource for Attendance {
    const PATH: &'static str = "/attendance";
    const LIST_KEY: &'static str = "attendance";
    const ITEM_KEY: &'static str = "attendance";
    const LABEL: &'static str = "Attendance";

    fn slice(state: &AppState) -> &SliceState<Self> {
        &state.attendance
    }

    fn action(action: SliceAction<Self>) -> AppAction {
        AppAction::Attendance(action)
    }
}

impl Resource for User {
    const PATH: &'static str = "/users";
    const LIST_KEY: &'static str = "users";
    const ITEM_KEY: &'static str = "user";
    const LABEL: &'static str = "User";

    fn slice(state: &AppState) -> &SliceState<Self> {
        &state.users
    }

    fn action(action: SliceAction<Self>) -> AppAction {
        AppAction::Users(action)
    }
}

impl Resource for Candidate {
    const PATH: &'static str = "/onboarding";
    const LIST_KEY: &'static str = "candidates";
    const ITEM_KEY: &'static str = "candidate";
    const LABEL: &'static str = "Candidate";

    fn slice(state: &AppState) -> &SliceState<Self> {
        &state.onboarding
    }

    fn action(action: SliceAction<Self>) -> AppAction {
        AppAction::Onboarding(action)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn item_path_keeps_the_id_in_one_segment() {
        assert_eq!(Task::item_path(&EntityId::new("t1")).unwrap(), "/tasks/t1");
        assert_eq!(
            User::item_path(&EntityId::new("../users/x")).unwrap(),
            "/users/..%2Fusers%2Fx"
        );
        assert_eq!(Leave::item_path(&EntityId::new("a?b#c")).unwrap(), "/leave/a%3Fb%23c");
    }

    #[test]
    fn item_path_rejects_dot_segments() {
        for raw in ["", ".", ".."] {
            assert!(matches!(
                Candidate::item_path(&EntityId::new(raw)),
                Err(ApiError::InvalidRequest(_))
            ));
        }
    }
}
