//! Reducer composition utilities
//!
//! This module provides utilities for composing reducers in various ways:
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//! - **`scope_reducer`**: Focus a reducer on one field of a larger state,
//!   one case of a larger action enum, and one part of a larger environment
//!
//! The application state is assembled this way: every entity slice reducer
//! is scoped onto its field of the app state and the scoped reducers are
//! combined into one.
//!
//! # Examples
//!
//! ```
//! use staffdesk_core::composition::{combine_reducers, scope_reducer};
//! use staffdesk_core::effect::Effect;
//! use staffdesk_core::reducer::Reducer;
//! use staffdesk_core::SmallVec;
//!
//! #[derive(Clone, Default)]
//! struct CounterState {
//!     count: i32,
//! }
//!
//! #[derive(Clone)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut CounterState, _action: CounterAction, _env: &()) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         state.count += 1;
//!         SmallVec::new()
//!     }
//! }
//!
//! #[derive(Clone, Default)]
//! struct AppState {
//!     left: CounterState,
//!     right: CounterState,
//! }
//!
//! #[derive(Clone)]
//! enum AppAction {
//!     Left(CounterAction),
//!     Right(CounterAction),
//! }
//!
//! let app = combine_reducers(vec![
//!     Box::new(scope_reducer(
//!         CounterReducer,
//!         |s: &mut AppState| &mut s.left,
//!         |a| match a { AppAction::Left(a) => Some(a), AppAction::Right(_) => None },
//!         AppAction::Left,
//!         |env: &()| env,
//!     )),
//!     Box::new(scope_reducer(
//!         CounterReducer,
//!         |s: &mut AppState| &mut s.right,
//!         |a| match a { AppAction::Right(a) => Some(a), AppAction::Left(_) => None },
//!         AppAction::Right,
//!         |env: &()| env,
//!     )),
//! ]);
//!
//! let mut state = AppState::default();
//! let _ = app.reduce(&mut state, AppAction::Right(CounterAction::Increment), &());
//! assert_eq!(state.left.count, 0);
//! assert_eq!(state.right.count, 1);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;
use std::marker::PhantomData;
use std::sync::Arc;

/// A boxed reducer that can be shared across store clones
pub type BoxedReducer<S, A, E> = Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence, and all effects are collected and concatenated.
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<BoxedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    CombinedReducer {
        reducers: reducers.into(),
    }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`]. Cloning is cheap: the reducers are shared.
pub struct CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    reducers: Arc<[BoxedReducer<S, A, E>]>,
}

impl<S, A, E> Clone for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    fn clone(&self) -> Self {
        Self {
            reducers: Arc::clone(&self.reducers),
        }
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in self.reducers.iter() {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects);
        }

        all_effects
    }
}

/// Scopes a reducer onto a part of a larger state, action and environment.
///
/// - `state`: lens from the parent state to the child state
/// - `extract`: picks the child action out of a parent action (`None` skips)
/// - `embed`: wraps child actions produced by effects back into parent actions
/// - `env`: lens from the parent environment to the child environment
pub fn scope_reducer<S, SubS, A, SubA, E, SubE, R>(
    reducer: R,
    state: fn(&mut S) -> &mut SubS,
    extract: fn(A) -> Option<SubA>,
    embed: fn(SubA) -> A,
    env: fn(&E) -> &SubE,
) -> ScopedReducer<S, SubS, A, SubA, E, SubE, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = SubE>,
{
    ScopedReducer {
        reducer,
        state,
        extract,
        embed,
        env,
        _phantom: PhantomData,
    }
}

/// A scoped reducer that operates on a subset of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, SubA, E, SubE, R> {
    reducer: R,
    state: fn(&mut S) -> &mut SubS,
    extract: fn(A) -> Option<SubA>,
    embed: fn(SubA) -> A,
    env: fn(&E) -> &SubE,
    _phantom: PhantomData<fn() -> (SubS, SubA, SubE)>,
}

impl<S, SubS, A, SubA, E, SubE, R: Clone> Clone for ScopedReducer<S, SubS, A, SubA, E, SubE, R> {
    fn clone(&self) -> Self {
        Self {
            reducer: self.reducer.clone(),
            state: self.state,
            extract: self.extract,
            embed: self.embed,
            env: self.env,
            _phantom: PhantomData,
        }
    }
}

impl<S, SubS, A, SubA, E, SubE, R> Reducer for ScopedReducer<S, SubS, A, SubA, E, SubE, R>
where
    A: Send + 'static,
    SubA: Send + 'static,
    R: Reducer<State = SubS, Action = SubA, Environment = SubE>,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(sub_action) = (self.extract)(action) else {
            return SmallVec::new();
        };

        self.reducer
            .reduce((self.state)(state), sub_action, (self.env)(env))
            .into_iter()
            .map(|effect| effect.map(self.embed))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::panic)] // Tests fail loudly on unexpected variants
mod tests {
    use super::*;
    use crate::smallvec;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Roster {
        headcount: u32,
        team: String,
    }

    #[derive(Clone)]
    enum RosterAction {
        Hired,
        Left,
        Renamed(String),
    }

    struct HeadcountReducer;

    impl Reducer for HeadcountReducer {
        type State = Roster;
        type Action = RosterAction;
        type Environment = ();

        fn reduce(
            &self,
            roster: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                RosterAction::Hired => roster.headcount += 1,
                RosterAction::Left => roster.headcount = roster.headcount.saturating_sub(1),
                RosterAction::Renamed(_) => {},
            }
            SmallVec::new()
        }
    }

    struct TeamNameReducer;

    impl Reducer for TeamNameReducer {
        type State = Roster;
        type Action = RosterAction;
        type Environment = ();

        fn reduce(
            &self,
            roster: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            if let RosterAction::Renamed(team) = action {
                roster.team = team;
            }
            SmallVec::new()
        }
    }

    #[test]
    fn combined_reducers_each_see_every_action() {
        let combined = combine_reducers(vec![Box::new(HeadcountReducer), Box::new(TeamNameReducer)]);
        let mut roster = Roster::default();

        let _ = combined.reduce(&mut roster, RosterAction::Hired, &());
        let _ = combined.reduce(&mut roster, RosterAction::Renamed("Payroll".to_string()), &());
        assert_eq!(roster.headcount, 1);
        assert_eq!(roster.team, "Payroll");

        let cloned = combined.clone();
        let _ = cloned.reduce(&mut roster, RosterAction::Left, &());
        let _ = cloned.reduce(&mut roster, RosterAction::Left, &());
        assert_eq!(roster.headcount, 0);
        assert_eq!(roster.team, "Payroll");
    }

    // Scoped reducer tests
    #[derive(Clone, Default)]
    struct SubState {
        value: i32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum SubAction {
        Add(i32),
        Expire,
    }

    struct SubReducer;

    impl Reducer for SubReducer {
        type State = SubState;
        type Action = SubAction;
        type Environment = Duration;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            ttl: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                SubAction::Add(n) => {
                    state.value += n;
                    smallvec![Effect::Delay {
                        duration: *ttl,
                        action: Box::new(SubAction::Expire),
                    }]
                },
                SubAction::Expire => {
                    state.value = 0;
                    SmallVec::new()
                },
            }
        }
    }

    #[derive(Clone, Default)]
    struct ParentState {
        sub: SubState,
        other: String,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum ParentAction {
        Sub(SubAction),
        Unrelated,
    }

    struct ParentEnv {
        ttl: Duration,
    }

    fn scoped() -> ScopedReducer<ParentState, SubState, ParentAction, SubAction, ParentEnv, Duration, SubReducer> {
        scope_reducer(
            SubReducer,
            |parent: &mut ParentState| &mut parent.sub,
            |action| match action {
                ParentAction::Sub(sub) => Some(sub),
                ParentAction::Unrelated => None,
            },
            ParentAction::Sub,
            |env: &ParentEnv| &env.ttl,
        )
    }

    #[test]
    fn test_scope_reducer_updates_only_its_field() {
        let env = ParentEnv {
            ttl: Duration::from_secs(3),
        };
        let mut state = ParentState {
            sub: SubState { value: 5 },
            other: "test".to_string(),
        };

        let effects = scoped().reduce(&mut state, ParentAction::Sub(SubAction::Add(3)), &env);

        assert_eq!(state.sub.value, 8);
        assert_eq!(state.other, "test");
        match effects.as_slice() {
            [Effect::Delay { duration, action }] => {
                assert_eq!(*duration, Duration::from_secs(3));
                assert_eq!(**action, ParentAction::Sub(SubAction::Expire));
            },
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_scope_reducer_ignores_other_actions() {
        let env = ParentEnv {
            ttl: Duration::from_secs(3),
        };
        let mut state = ParentState::default();

        let effects = scoped().reduce(&mut state, ParentAction::Unrelated, &env);

        assert!(effects.is_empty());
        assert_eq!(state.sub.value, 0);
    }
}
