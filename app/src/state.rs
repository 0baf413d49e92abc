//! Application state and actions.

use crate::auth::{AuthAction, AuthState};
use crate::entities::{Attendance, Candidate, Leave, Task, User};
use crate::toast::{ToastAction, ToastState};
use staffdesk_core::slice::{SliceAction, SliceState};

/// Everything the client holds
///
/// Only `auth` is persisted; the entity slices are refetched each session.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Signed-in user and token
    pub auth: AuthState,
    /// Cached tasks
    pub tasks: SliceState<Task>,
    /// Cached leave requests
    pub leaves: SliceState<Leave>,
    /// Cached attendance records
    pub attendance: SliceState<Attendance>,
    /// Cached user accounts
    pub users: SliceState<User>,
    /// Cached onboarding candidates
    pub onboarding: SliceState<Candidate>,
    /// Active notifications
    pub toasts: ToastState,
}

/// Every input to the root reducer
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Authentication
    Auth(AuthAction),
    /// Task slice
    Tasks(SliceAction<Task>),
    /// Leave slice
    Leaves(SliceAction<Leave>),
    /// Attendance slice
    Attendance(SliceAction<Attendance>),
    /// User slice
    Users(SliceAction<User>),
    /// Onboarding slice
    Onboarding(SliceAction<Candidate>),
    /// Notifications
    Toast(ToastAction),
}

impl AppAction {
    /// Short `slice.action` name for logs
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Auth(action) => format!("auth.{}", action.name()),
            Self::Tasks(action) => format!("tasks.{}", action.name()),
            Self::Leaves(action) => format!("leaves.{}", action.name()),
            Self::Attendance(action) => format!("attendance.{}", action.name()),
            Self::Users(action) => format!("users.{}", action.name()),
            Self::Onboarding(action) => format!("onboarding.{}", action.name()),
            Self::Toast(action) => format!("toast.{}", action.name()),
        }
    }
}
