//! Root reducer and its environment.

use crate::auth::{AuthReducer, SnapshotWriter};
use crate::entities::{Attendance, Candidate, Leave, Task, User};
use crate::state::{AppAction, AppState};
use crate::toast::ToastReducer;
use staffdesk_core::composition::{CombinedReducer, combine_reducers, scope_reducer};
use staffdesk_core::effect::Effect;
use staffdesk_core::environment::Clock;
use staffdesk_core::reducer::Reducer;
use staffdesk_core::slice::SliceReducer;
use staffdesk_core::SmallVec;
use std::sync::Arc;
use std::time::Duration;

/// Dependencies injected into every reducer
#[derive(Clone)]
pub struct AppEnvironment {
    /// Time source for `last_synced` and toast timestamps
    pub clock: Arc<dyn Clock>,
    /// Ordered writer of the auth snapshot
    pub snapshots: Arc<SnapshotWriter>,
    /// How long a toast stays visible
    pub toast_ttl: Duration,
}

impl std::fmt::Debug for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppEnvironment")
            .field("toast_ttl", &self.toast_ttl)
            .finish_non_exhaustive()
    }
}

/// The root reducer: each slice reducer scoped onto its field of
/// [`AppState`]
#[derive(Clone)]
pub struct AppReducer {
    inner: CombinedReducer<AppState, AppAction, AppEnvironment>,
}

impl AppReducer {
    /// Assemble the root reducer
    #[must_use]
    pub fn new() -> Self {
        let inner = combine_reducers(vec![
            Box::new(scope_reducer(
                AuthReducer,
                |s: &mut AppState| &mut s.auth,
                |a| match a {
                    AppAction::Auth(a) => Some(a),
                    _ => None,
                },
                AppAction::Auth,
                |env: &AppEnvironment| env,
            )),
            Box::new(scope_reducer(
                SliceReducer::<Task>::new(),
                |s: &mut AppState| &mut s.tasks,
                |a| match a {
                    AppAction::Tasks(a) => Some(a),
                    _ => None,
                },
                AppAction::Tasks,
                |env: &AppEnvironment| &env.clock,
            )),
            Box::new(scope_reducer(
                SliceReducer::<Leave>::new(),
                |s: &mut AppState| &mut s.leaves,
                |a| match a {
                    AppAction::Leaves(a) => Some(a),
                    _ => None,
                },
                AppAction::Leaves,
                |env: &AppEnvironment| &env.clock,
            )),
            Box::new(scope_reducer(
                SliceReducer::<Attendance>::new(),
                |s: &mut AppState| &mut s.attendance,
                |a| match a {
                    AppAction::Attendance(a) => Some(a),
                    _ => None,
                },
                AppAction::Attendance,
                |env: &AppEnvironment| &env.clock,
            )),
            Box::new(scope_reducer(
                SliceReducer::<User>::new(),
                |s: &mut AppState| &mut s.users,
                |a| match a {
                    AppAction::Users(a) => Some(a),
                    _ => None,
                },
                AppAction::Users,
                |env: &AppEnvironment| &env.clock,
            )),
            Box::new(scope_reducer(
                SliceReducer::<Candidate>::new(),
                |s: &mut AppState| &mut s.onboarding,
                |a| match a {
                    AppAction::Onboarding(a) => Some(a),
                    _ => None,
                },
                AppAction::Onboarding,
                |env: &AppEnvironment| &env.clock,
            )),
            Box::new(scope_reducer(
                ToastReducer,
                |s: &mut AppState| &mut s.toasts,
                |a| match a {
                    AppAction::Toast(a) => Some(a),
                    _ => None,
                },
                AppAction::Toast,
                |env: &AppEnvironment| env,
            )),
        ]);

        Self { inner }
    }
}

impl Default for AppReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::trace!(action = %action.name(), "Reducing");
        self.inner.reduce(state, action, env)
    }
}
