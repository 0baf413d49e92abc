//! # StaffDesk Runtime
//!
//! Runtime implementation for the StaffDesk client state layer.
//!
//! This crate provides the Store: the single object that owns application
//! state, runs reducers and executes the effects they return. It is
//! constructed once at startup and handed to the HTTP client's collaborators
//! and to the data-access hooks.
//!
//! ## Core Components
//!
//! - **Store**: Owns state and serializes dispatches
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **`EffectHandle`**: Lets callers await the effects of a dispatched action
//!
//! ## Example
//!
//! ```ignore
//! use staffdesk_runtime::Store;
//!
//! let store = Store::new(AppState::default(), AppReducer::new(), environment);
//!
//! // Dispatch an action
//! store.send(AppAction::Tasks(SliceAction::FetchStart)).await?;
//!
//! // Read state
//! let loading = store.state(|s| s.tasks.loading).await;
//! ```

use staffdesk_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Prometheus metrics for observability
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a matching action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects of that
/// action (not the effects of actions they feed back) to complete.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(AppAction::Auth(AuthAction::Logout)).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // The persisted auth snapshot is now cleared
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a handle plus the tracking side used while effects execute
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracker is gone, so nothing can still be running.
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns `Err(())` if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), ()> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| ())
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Keeps the counter accurate even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, DecrementGuard, Duration, Effect,
        EffectHandle, EffectTracking, Ordering, Reducer, RwLock, StoreError,
    };
    use tokio::sync::{broadcast, watch};

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; one dispatch mutates it at a time)
    /// 2. Reducer (state transitions)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Cloning a store is cheap and every clone shares the same state.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        /// Every dispatched action is broadcast to observers after the reducer ran.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The action broadcast buffers 64 actions; use
        /// [`Store::with_broadcast_capacity`] for more.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 64)
        }

        /// Create a new Store with custom action broadcast capacity
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                action_broadcast,
            }
        }

        /// Access the injected environment
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Initiate graceful shutdown of the store
        ///
        /// Rejects new actions, then waits for pending effects (pending toast
        /// dismissals, snapshot writes) to finish.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store_shutdown_total").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(20);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timed out");
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Broadcasts the action to observers
        /// 4. Executes returned effects asynchronously; actions they produce
        ///    are sent back through the store
        ///
        /// `send()` returns once the state update is visible, before the
        /// effects complete. Concurrent sends serialize at the reducer.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store_rejected_actions_total").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("store_actions_total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action.clone(), &self.environment);
                metrics::histogram!("store_reducer_duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!(effects = effects.len(), "Reducer completed");
                effects
            };

            // No receivers is fine: nobody is observing.
            let _ = self.action_broadcast.send(action);

            for effect in effects {
                self.execute_effect(effect, tracking.clone());
            }

            Ok(handle)
        }

        /// Send an action and wait for a matching action
        ///
        /// Subscribes to the action broadcast before sending, so a matching
        /// action produced by the effects of `action` cannot be missed.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action within `timeout`
        /// - [`StoreError::ChannelClosed`]: broadcast closed
        /// - [`StoreError::ShutdownInProgress`]: store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            R: Clone,
            E: Clone,
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to every action dispatched through this store
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let task_count = store.state(|s| s.tasks.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Execute an effect with tracking
        ///
        /// - `None`: No-op
        /// - `Future`: Executes async computation, sends resulting action if `Some`
        /// - `Delay`: Waits for duration, then sends action
        /// - `Parallel`: Executes effects concurrently
        /// - `Sequential`: Executes effects in order, waiting for each to complete
        ///
        /// A panicking effect only takes down its own task; the guards keep
        /// the counters accurate.
        #[allow(clippy::needless_pass_by_value)] // tracking is cloned into spawned tasks
        fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking)
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    metrics::counter!("store_effects_executed_total", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("store_effects_executed_total", "type" => "future").increment(1);
                    let (guard, pending_guard) = self.track(&tracking);
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        let _pending_guard = pending_guard;

                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action");
                            let _ = store.send(action).await;
                        }
                    });
                },
                Effect::Delay { duration, action } => {
                    metrics::counter!("store_effects_executed_total", "type" => "delay").increment(1);
                    let (guard, pending_guard) = self.track(&tracking);
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        let _pending_guard = pending_guard;

                        tokio::time::sleep(duration).await;
                        let _ = store.send(*action).await;
                    });
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store_effects_executed_total", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking.clone());
                    }
                },
                Effect::Sequential(effects) => {
                    metrics::counter!("store_effects_executed_total", "type" => "sequential").increment(1);
                    let (guard, pending_guard) = self.track(&tracking);
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        let _pending_guard = pending_guard;

                        for effect in effects {
                            let (sub_tx, mut sub_rx) = watch::channel(());
                            let sub_tracking = EffectTracking {
                                counter: Arc::new(AtomicUsize::new(0)),
                                notifier: sub_tx,
                            };

                            store.execute_effect(effect, sub_tracking.clone());

                            while sub_tracking.counter.load(Ordering::SeqCst) > 0 {
                                if sub_rx.changed().await.is_err() {
                                    break;
                                }
                            }
                        }
                    });
                },
            }
        }

        /// Register a spawned effect with both the handle and shutdown counters
        fn track(&self, tracking: &EffectTracking) -> (DecrementGuard, AtomicCounterGuard) {
            tracking.increment();
            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            (
                DecrementGuard(tracking.clone()),
                AtomicCounterGuard(Arc::clone(&self.pending_effects)),
            )
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

#[cfg(test)]
#[allow(clippy::panic)] // Tests are allowed to panic on failures
mod tests {
    use super::*;
    use staffdesk_core::{SmallVec, smallvec};

    /// Unread-notification badge, bumped directly or by effects
    #[derive(Debug, Clone, Default)]
    struct Badge {
        unread: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum BadgeAction {
        Arrived,
        Read,
        Ignored,
        /// Poll once; the poll reports one arrival
        Poll,
        /// Poll after `Environment` elapses
        PollLater,
        /// Three sources polled at once
        PollAll,
        /// Arrival, arrival, read, in order
        Replay,
        /// A poll whose future panics
        BrokenPoll,
    }

    #[derive(Debug, Clone)]
    struct BadgeReducer;

    impl Reducer for BadgeReducer {
        type State = Badge;
        type Action = BadgeAction;
        type Environment = Duration;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            poll_delay: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            let arrival = || Effect::Future(Box::pin(async { Some(BadgeAction::Arrived) }));

            match action {
                BadgeAction::Arrived => {
                    state.unread += 1;
                    SmallVec::new()
                },
                BadgeAction::Read => {
                    state.unread -= 1;
                    SmallVec::new()
                },
                BadgeAction::Ignored => smallvec![Effect::None],
                BadgeAction::Poll => smallvec![arrival()],
                BadgeAction::PollLater => smallvec![Effect::Delay {
                    duration: *poll_delay,
                    action: Box::new(BadgeAction::Arrived),
                }],
                BadgeAction::PollAll => smallvec![Effect::Parallel(vec![arrival(), arrival(), arrival()])],
                BadgeAction::Replay => smallvec![Effect::Sequential(vec![
                    arrival(),
                    arrival(),
                    Effect::Future(Box::pin(async { Some(BadgeAction::Read) })),
                ])],
                BadgeAction::BrokenPoll => smallvec![Effect::Future(Box::pin(async {
                    panic!("poll exploded");
                }))],
            }
        }
    }

    type BadgeStore = Store<Badge, BadgeAction, Duration, BadgeReducer>;

    fn store() -> BadgeStore {
        Store::new(Badge::default(), BadgeReducer, Duration::from_millis(10))
    }

    async fn unread(store: &BadgeStore) -> i32 {
        store.state(|s| s.unread).await
    }

    #[tokio::test]
    async fn reducer_runs_for_each_send() {
        let store = store();

        for action in [BadgeAction::Arrived, BadgeAction::Arrived, BadgeAction::Read, BadgeAction::Ignored] {
            let _ = store.send(action).await;
        }

        assert_eq!(unread(&store).await, 1);
    }

    #[tokio::test]
    async fn future_result_is_dispatched() -> Result<(), StoreError> {
        let store = store();

        store.send(BadgeAction::Poll).await?.wait().await;

        assert_eq!(unread(&store).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn delayed_action_waits_its_turn() -> Result<(), StoreError> {
        let store = store();

        let mut handle = store.send(BadgeAction::PollLater).await?;
        assert_eq!(unread(&store).await, 0);
        assert_eq!(handle.pending(), 1);

        handle.wait().await;
        assert_eq!(unread(&store).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn parallel_effects_all_land() -> Result<(), StoreError> {
        let store = store();

        store.send(BadgeAction::PollAll).await?.wait().await;

        assert_eq!(unread(&store).await, 3);
        Ok(())
    }

    #[tokio::test]
    async fn sequential_effects_land_in_order() -> Result<(), StoreError> {
        let store = store();
        let mut seen = store.subscribe_actions();

        store.send(BadgeAction::Replay).await?.wait().await;

        assert_eq!(unread(&store).await, 1);
        let mut order = Vec::new();
        while let Ok(action) = seen.try_recv() {
            order.push(action);
        }
        assert_eq!(
            order,
            vec![
                BadgeAction::Replay,
                BadgeAction::Arrived,
                BadgeAction::Arrived,
                BadgeAction::Read
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn sends_from_many_tasks_are_serialized() {
        let store = store();

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.send(BadgeAction::Arrived).await.map(|_| ()) })
            })
            .collect();

        for task in tasks {
            match task.await {
                Ok(Ok(())) => {},
                Ok(Err(e)) => panic!("send rejected: {e}"),
                Err(e) => panic!("send task panicked: {e}"),
            }
        }

        assert_eq!(unread(&store).await, 10);
    }

    #[tokio::test]
    async fn panicking_effect_does_not_poison_the_store() -> Result<(), StoreError> {
        let store = store();

        store.send(BadgeAction::BrokenPoll).await?.wait().await;
        store.send(BadgeAction::Arrived).await?;

        assert_eq!(unread(&store).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn send_and_wait_for_returns_the_matching_action() -> Result<(), StoreError> {
        let store = store();

        let action = store
            .send_and_wait_for(
                BadgeAction::PollLater,
                |a| *a == BadgeAction::Arrived,
                Duration::from_secs(1),
            )
            .await?;

        assert_eq!(action, BadgeAction::Arrived);
        Ok(())
    }

    #[tokio::test]
    async fn closed_store_rejects_sends() -> Result<(), StoreError> {
        let store = store();

        store.shutdown(Duration::from_secs(1)).await?;

        assert!(matches!(
            store.send(BadgeAction::Arrived).await,
            Err(StoreError::ShutdownInProgress)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn shutdown_times_out_on_a_long_delay() {
        let store = Store::new(Badge::default(), BadgeReducer, Duration::from_secs(5));

        let _ = store.send(BadgeAction::PollLater).await;

        assert!(matches!(
            store.shutdown(Duration::from_millis(50)).await,
            Err(StoreError::ShutdownTimeout(1))
        ));
    }

    #[tokio::test]
    async fn completed_handle_does_not_block() {
        let mut handle = EffectHandle::completed();
        assert_eq!(handle.pending(), 0);
        assert!(handle.wait_with_timeout(Duration::from_millis(50)).await.is_ok());
    }
}
