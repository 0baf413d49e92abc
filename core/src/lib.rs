//! # StaffDesk Core
//!
//! Core traits and types for the StaffDesk client state layer.
//!
//! Client state is held in slices that only change through actions. A
//! reducer turns `(State, Action, Environment)` into an updated state plus
//! effect descriptions that the runtime executes.
//!
//! ## Core Concepts
//!
//! - **State**: Cached client data for a feature (e.g. the task list)
//! - **Action**: Every input to a reducer (start/success/failure transitions)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//! - **Slice**: A reusable entity list with `loading`/`error` flags, see [`slice`]
//!
//! ## Example
//!
//! ```
//! use staffdesk_core::entity::Entity;
//! use staffdesk_core::environment::SystemClock;
//! use staffdesk_core::reducer::Reducer;
//! use staffdesk_core::slice::{SliceAction, SliceReducer, SliceState};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Note {
//!     id: String,
//!     body: String,
//! }
//!
//! impl Entity for Note {
//!     type Id = String;
//!
//!     fn id(&self) -> &String {
//!         &self.id
//!     }
//! }
//!
//! let clock: Arc<dyn staffdesk_core::environment::Clock> = Arc::new(SystemClock);
//! let mut state = SliceState::<Note>::default();
//!
//! let _ = SliceReducer::new().reduce(&mut state, SliceAction::FetchStart, &clock);
//! assert!(state.loading);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Reducer composition utilities
pub mod composition;

/// Entities identified by a server-assigned id
pub mod entity;

/// Generic entity slice (items + loading + error)
pub mod slice;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all state transition logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for ToastReducer {
    ///     type State = ToastState;
    ///     type Action = ToastAction;
    ///     type Environment = Duration;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut ToastState,
    ///         action: ToastAction,
    ///         ttl: &Duration,
    ///     ) -> SmallVec<[Effect<ToastAction>; 4]> {
    ///         match action {
    ///             ToastAction::Dismiss { id } => {
    ///                 state.dismiss(id);
    ///                 SmallVec::new()
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Updates state in place
        /// 2. Returns effect descriptions to be executed
        ///
        /// # Returns
        ///
        /// The effects to be executed by the runtime (usually zero or one)
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (toast expiry, debounced refresh)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Wrap a future that runs for its side effect only
        ///
        /// The future's output is discarded and nothing is fed back.
        #[must_use]
        pub fn fire_and_forget<F>(future: F) -> Effect<Action>
        where
            F: Future<Output = ()> + Send + 'static,
            Action: 'static,
        {
            Effect::Future(Box::pin(async move {
                future.await;
                None
            }))
        }
    }

    impl<Action: Send + 'static> Effect<Action> {
        /// Lift an effect into a parent action type
        ///
        /// Used by [`crate::composition::scope_reducer`] so that actions produced
        /// by a child reducer's effects are fed back as parent actions.
        #[must_use]
        pub fn map<Parent: Send + 'static>(self, embed: fn(Action) -> Parent) -> Effect<Parent> {
            match self {
                Effect::None => Effect::None,
                Effect::Parallel(effects) => {
                    Effect::Parallel(effects.into_iter().map(|e| e.map(embed)).collect())
                },
                Effect::Sequential(effects) => {
                    Effect::Sequential(effects.into_iter().map(|e| e.map(embed)).collect())
                },
                Effect::Delay { duration, action } => Effect::Delay {
                    duration,
                    action: Box::new(embed(*action)),
                },
                Effect::Future(fut) => Effect::Future(Box::pin(async move { fut.await.map(embed) })),
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// External dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock backed by [`Utc::now`]
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)] // Tests fail loudly on unexpected variants
mod tests {
    use super::effect::Effect;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Child {
        Ping,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Parent {
        Child(Child),
    }

    #[test]
    fn map_lifts_delayed_action() {
        let effect = Effect::Delay {
            duration: Duration::from_millis(5),
            action: Box::new(Child::Ping),
        };

        match effect.map(Parent::Child) {
            Effect::Delay { duration, action } => {
                assert_eq!(duration, Duration::from_millis(5));
                assert_eq!(*action, Parent::Child(Child::Ping));
            },
            other => panic!("unexpected effect: {other:?}"),
        }
    }

    #[test]
    fn map_lifts_future_output() {
        let effect: Effect<Child> = Effect::Future(Box::pin(async { Some(Child::Ping) }));

        let Effect::Future(fut) = effect.map(Parent::Child) else {
            panic!("expected a future effect");
        };
        assert_eq!(tokio_test::block_on(fut), Some(Parent::Child(Child::Ping)));
    }

    #[test]
    fn fire_and_forget_produces_no_action() {
        let effect: Effect<Child> = Effect::fire_and_forget(async {});

        let Effect::Future(fut) = effect else {
            panic!("expected a future effect");
        };
        assert_eq!(tokio_test::block_on(fut), None);
    }
}
