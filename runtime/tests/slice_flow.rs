//! Integration tests for driving an entity slice through the Store
//!
//! A thin reducer turns a `Load` request into a simulated server round trip
//! and feeds the outcome back as ordinary slice actions.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use staffdesk_core::entity::Entity;
use staffdesk_core::environment::Clock;
use staffdesk_core::slice::{SliceAction, SliceReducer, SliceState};
use staffdesk_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use staffdesk_runtime::{Store, StoreError};
use staffdesk_testing::test_clock;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
struct Ticket {
    id: u32,
    title: String,
}

impl Entity for Ticket {
    type Id = u32;

    fn id(&self) -> &u32 {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TicketAction {
    /// Simulated request; `Err` makes the fake server fail
    Load(Result<Vec<Ticket>, String>),
    Slice(SliceAction<Ticket>),
}

#[derive(Clone)]
struct TicketReducer;

impl Reducer for TicketReducer {
    type State = SliceState<Ticket>;
    type Action = TicketAction;
    type Environment = Arc<dyn Clock>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        clock: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TicketAction::Load(outcome) => {
                let _ = SliceReducer::new().reduce(state, SliceAction::FetchStart, clock);
                smallvec![Effect::Future(Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Some(TicketAction::Slice(match outcome {
                        Ok(items) => SliceAction::FetchSuccess(items),
                        Err(message) => SliceAction::FetchFailure(message),
                    }))
                }))]
            },
            TicketAction::Slice(action) => SliceReducer::new()
                .reduce(state, action, clock)
                .into_iter()
                .map(|effect| effect.map(TicketAction::Slice))
                .collect(),
        }
    }
}

fn ticket(id: u32, title: &str) -> Ticket {
    Ticket {
        id,
        title: title.to_string(),
    }
}

fn store() -> Store<SliceState<Ticket>, TicketAction, Arc<dyn Clock>, TicketReducer> {
    let clock: Arc<dyn Clock> = Arc::new(test_clock());
    Store::new(SliceState::default(), TicketReducer, clock)
}

#[tokio::test]
async fn loading_is_visible_before_the_response_arrives() -> Result<(), StoreError> {
    let store = store();

    let mut handle = store.send(TicketAction::Load(Ok(vec![ticket(1, "a")]))).await?;
    assert!(store.state(|s| s.loading).await);

    handle.wait().await;
    assert_eq!(handle.pending(), 0);

    let (loading, len, synced) = store
        .state(|s| (s.loading, s.len(), s.last_synced.is_some()))
        .await;
    assert!(!loading);
    assert_eq!(len, 1);
    assert!(synced);
    Ok(())
}

#[tokio::test]
async fn failure_outcome_is_observable_by_waiters() -> Result<(), StoreError> {
    let store = store();

    let action = store
        .send_and_wait_for(
            TicketAction::Load(Err("Forbidden".to_string())),
            |a| matches!(a, TicketAction::Slice(SliceAction::FetchFailure(_))),
            Duration::from_secs(1),
        )
        .await?;

    assert_eq!(
        action,
        TicketAction::Slice(SliceAction::FetchFailure("Forbidden".to_string()))
    );
    assert_eq!(store.state(|s| s.error.clone()).await.as_deref(), Some("Forbidden"));
    Ok(())
}

#[tokio::test]
async fn wait_times_out_when_nothing_matches() {
    let store = store();

    let result = store
        .send_and_wait_for(
            TicketAction::Slice(SliceAction::FetchStart),
            |a| matches!(a, TicketAction::Slice(SliceAction::Cancelled)),
            Duration::from_millis(30),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Timeout)));
}

#[tokio::test]
async fn shutdown_drains_in_flight_requests_and_drops_their_results() -> Result<(), StoreError> {
    let store = store();

    let _ = store.send(TicketAction::Load(Ok(vec![ticket(7, "late")]))).await?;
    store.shutdown(Duration::from_secs(1)).await?;

    // The response arrived after shutdown began, so it was rejected.
    let (loading, empty) = store.state(|s| (s.loading, s.is_empty())).await;
    assert!(loading);
    assert!(empty);
    assert!(matches!(
        store.send(TicketAction::Slice(SliceAction::Cancelled)).await,
        Err(StoreError::ShutdownInProgress)
    ));
    Ok(())
}

#[tokio::test]
async fn every_observer_sees_the_full_lifecycle() -> Result<(), StoreError> {
    let store = store();
    let mut first = store.subscribe_actions();
    let mut second = store.subscribe_actions();

    let mut handle = store.send(TicketAction::Load(Ok(Vec::new()))).await?;
    handle.wait().await;

    for rx in [&mut first, &mut second] {
        assert!(matches!(rx.recv().await, Ok(TicketAction::Load(_))));
        assert_eq!(
            rx.recv().await.ok(),
            Some(TicketAction::Slice(SliceAction::FetchSuccess(Vec::new())))
        );
    }
    Ok(())
}
