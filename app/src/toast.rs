//! Transient notifications ("toasts").
//!
//! A toast stays active for the configured TTL and is then dismissed by a
//! delayed action. Showing a toast identical to one that is still active is
//! a no-op, which collapses the duplicate raised when both the HTTP client
//! and a hook report the same failure.

use crate::reducer::AppEnvironment;
use chrono::{DateTime, Utc};
use staffdesk_client::NotificationKind;
use staffdesk_core::effect::Effect;
use staffdesk_core::environment::Clock;
use staffdesk_core::reducer::Reducer;
use staffdesk_core::{SmallVec, smallvec};

/// An active notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Identifier used to dismiss it
    pub id: u64,
    /// Severity
    pub kind: NotificationKind,
    /// Text shown
    pub message: String,
    /// When it was raised
    pub raised_at: DateTime<Utc>,
}

/// Active notifications, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastState {
    /// Currently visible toasts
    pub active: Vec<Toast>,
    next_id: u64,
}

/// Notification transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastAction {
    /// Raise a toast
    Show {
        /// Severity
        kind: NotificationKind,
        /// Text
        message: String,
    },
    /// Remove one toast (TTL elapsed or closed by the user)
    Dismiss {
        /// Toast to remove
        id: u64,
    },
    /// Remove every toast
    Clear,
}

impl ToastAction {
    /// Short name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Show { .. } => "show",
            Self::Dismiss { .. } => "dismiss",
            Self::Clear => "clear",
        }
    }
}

/// Reducer for [`ToastState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ToastReducer;

impl Reducer for ToastReducer {
    type State = ToastState;
    type Action = ToastAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ToastAction::Show { kind, message } => {
                if state
                    .active
                    .iter()
                    .any(|t| t.kind == kind && t.message == message)
                {
                    return SmallVec::new();
                }

                let id = state.next_id;
                state.next_id += 1;
                state.active.push(Toast {
                    id,
                    kind,
                    message,
                    raised_at: env.clock.now(),
                });
                metrics::counter!("toasts_shown_total", "kind" => kind.to_string()).increment(1);

                smallvec![Effect::Delay {
                    duration: env.toast_ttl,
                    action: Box::new(ToastAction::Dismiss { id }),
                }]
            },
            ToastAction::Dismiss { id } => {
                state.active.retain(|t| t.id != id);
                SmallVec::new()
            },
            ToastAction::Clear => {
                state.active.clear();
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SnapshotWriter;
    use proptest::prelude::*;
    use staffdesk_client::MemoryStorage;
    use staffdesk_testing::properties::message;
    use staffdesk_testing::{ReducerTest, assertions, test_clock};
    use std::sync::Arc;
    use std::time::Duration;

    fn env() -> AppEnvironment {
        AppEnvironment {
            clock: Arc::new(test_clock()),
            snapshots: Arc::new(SnapshotWriter::new(Arc::new(MemoryStorage::new()))),
            toast_ttl: Duration::from_millis(4000),
        }
    }

    fn show(message: &str) -> ToastAction {
        ToastAction::Show {
            kind: NotificationKind::Error,
            message: message.to_string(),
        }
    }

    #[test]
    fn show_schedules_dismissal() {
        ReducerTest::new(ToastReducer)
            .with_env(env())
            .given_state(ToastState::default())
            .when_action(show("Not authorized"))
            .then_state(|state| {
                assert_eq!(state.active.len(), 1);
                assert_eq!(state.active[0].message, "Not authorized");
            })
            .then_effects(|effects| {
                let action = assertions::assert_has_delay_effect(effects, Duration::from_millis(4000));
                assert_eq!(*action, ToastAction::Dismiss { id: 0 });
            })
            .run();
    }

    #[test]
    fn identical_active_toast_is_not_repeated() {
        let env = env();
        let mut state = ToastState::default();

        let _ = ToastReducer.reduce(&mut state, show("Not authorized"), &env);
        let effects = ToastReducer.reduce(&mut state, show("Not authorized"), &env);

        assert_eq!(state.active.len(), 1);
        assert!(effects.is_empty());
    }

    #[test]
    fn same_text_with_other_kind_is_shown() {
        let env = env();
        let mut state = ToastState::default();

        let _ = ToastReducer.reduce(&mut state, show("Saved"), &env);
        let _ = ToastReducer.reduce(
            &mut state,
            ToastAction::Show {
                kind: NotificationKind::Success,
                message: "Saved".to_string(),
            },
            &env,
        );

        assert_eq!(state.active.len(), 2);
    }

    #[test]
    fn dismissed_toast_can_be_raised_again_with_a_new_id() {
        let env = env();
        let mut state = ToastState::default();

        let _ = ToastReducer.reduce(&mut state, show("Offline"), &env);
        let _ = ToastReducer.reduce(&mut state, ToastAction::Dismiss { id: 0 }, &env);
        assert!(state.active.is_empty());

        let _ = ToastReducer.reduce(&mut state, show("Offline"), &env);
        assert_eq!(state.active.len(), 1);
        assert_eq!(state.active[0].id, 1);
    }

    #[test]
    fn dismissing_unknown_id_is_harmless() {
        let env = env();
        let mut state = ToastState::default();
        let _ = ToastReducer.reduce(&mut state, show("Offline"), &env);

        let _ = ToastReducer.reduce(&mut state, ToastAction::Dismiss { id: 42 }, &env);

        assert_eq!(state.active.len(), 1);
    }

    proptest! {
        #[test]
        fn active_toasts_are_distinct(messages in prop::collection::vec(message(), 1..20)) {
            let env = env();
            let mut state = ToastState::default();

            for text in &messages {
                let _ = ToastReducer.reduce(&mut state, show(text), &env);
            }

            let mut distinct = messages.clone();
            distinct.sort();
            distinct.dedup();
            prop_assert_eq!(state.active.len(), distinct.len());
        }
    }
}
