//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use staffdesk_core::{effect::Effect, reducer::Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// # Example
///
/// ```ignore
/// use staffdesk_testing::ReducerTest;
///
/// ReducerTest::new(ToastReducer)
///     .with_env(Duration::from_secs(4))
///     .given_state(ToastState::default())
///     .when_action(ToastAction::Show { kind, message: "Saved".into() })
///     .then_state(|state| {
///         assert_eq!(state.active.len(), 1);
///     })
///     .then_effects(|effects| {
///         assertions::assert_has_delay_effect(effects, Duration::from_secs(4));
///     })
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    action: Option<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    S: Clone,
    A: Clone,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            action: None,
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Set the action to test (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.action = Some(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the resulting effects (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Reduce the action and check every assertion, states first
    ///
    /// # Panics
    ///
    /// Panics if the state, action or environment is missing, or if an
    /// assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    pub fn run(self) {
        let (Some(mut state), Some(action), Some(env)) = (self.initial_state, self.action, self.environment)
        else {
            panic!("ReducerTest needs given_state(), when_action() and with_env() before run()");
        };

        let effects = self.reducer.reduce(&mut state, action, &env);

        self.state_assertions.into_iter().for_each(|check| check(&state));
        self.effect_assertions.into_iter().for_each(|check| check(&effects));
    }
}

/// Helper assertions for effects
pub mod assertions {
    use staffdesk_core::effect::Effect;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if effects is not empty.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.is_empty() || matches!(effects, [Effect::None]),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain at least one Future effect
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }

    /// Assert that effects contain a `Delay` of exactly `duration`
    ///
    /// Returns the delayed action for further inspection.
    ///
    /// # Panics
    ///
    /// Panics if no matching `Delay` effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_delay_effect<A: std::fmt::Debug>(
        effects: &[Effect<A>],
        duration: std::time::Duration,
    ) -> &A {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Delay {
                    duration: d,
                    action,
                } if *d == duration => Some(&**action),
                _ => None,
            })
            .unwrap_or_else(|| panic!("Expected a Delay effect of {duration:?}, found {effects:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staffdesk_core::effect::Effect;
    use staffdesk_core::reducer::Reducer;
    use staffdesk_core::{SmallVec, smallvec};
    use std::time::Duration;

    /// Requests in flight, with a reminder scheduled when one starts
    #[derive(Clone, Debug, Default)]
    struct InFlight {
        pending: u32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Request {
        Started,
        Settled,
        Overdue,
    }

    struct InFlightReducer;

    impl Reducer for InFlightReducer {
        type State = InFlight;
        type Action = Request;
        type Environment = Duration;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            overdue_after: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                Request::Started => {
                    state.pending += 1;
                    smallvec![Effect::Delay {
                        duration: *overdue_after,
                        action: Box::new(Request::Overdue),
                    }]
                },
                Request::Settled => {
                    state.pending = state.pending.saturating_sub(1);
                    smallvec![Effect::None]
                },
                Request::Overdue => SmallVec::new(),
            }
        }
    }

    #[test]
    fn start_schedules_overdue_reminder() {
        ReducerTest::new(InFlightReducer)
            .with_env(Duration::from_secs(30))
            .given_state(InFlight::default())
            .when_action(Request::Started)
            .then_state(|state| assert_eq!(state.pending, 1))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                let reminder = assertions::assert_has_delay_effect(effects, Duration::from_secs(30));
                assert_eq!(*reminder, Request::Overdue);
            })
            .run();
    }

    #[test]
    fn settle_never_underflows() {
        ReducerTest::new(InFlightReducer)
            .with_env(Duration::from_secs(30))
            .given_state(InFlight::default())
            .when_action(Request::Settled)
            .then_state(|state| assert_eq!(state.pending, 0))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    #[should_panic(expected = "before run()")]
    fn missing_state_is_reported() {
        ReducerTest::new(InFlightReducer)
            .with_env(Duration::from_secs(30))
            .when_action(Request::Started)
            .run();
    }

    #[test]
    #[should_panic(expected = "Expected a Delay effect")]
    fn delay_assertion_checks_the_duration() {
        let effects = InFlightReducer.reduce(&mut InFlight::default(), Request::Started, &Duration::from_secs(5));

        let _ = assertions::assert_has_delay_effect(&effects, Duration::from_secs(30));
    }

    #[test]
    #[should_panic(expected = "at least one Future effect")]
    fn future_assertion_rejects_plain_effects() {
        assertions::assert_has_future_effect::<Request>(&[Effect::None]);
    }
}
