//! Entity slices: a cached list of server records plus request flags.
//!
//! Every domain (tasks, leaves, attendance, users, onboarding) is an
//! instance of [`SliceState`] driven by [`SliceReducer`]. State only changes
//! through the start/success/failure triples in [`SliceAction`]; nothing is
//! applied before the server acknowledges it, so there is no rollback path.
//!
//! # Lifecycle
//!
//! ```text
//! idle ──*Start──▶ pending ──*Success──▶ idle (items updated)
//!                          └─*Failure──▶ idle (error set, items untouched)
//! ```

use crate::effect::Effect;
use crate::entity::Entity;
use crate::environment::Clock;
use crate::reducer::Reducer;
use chrono::{DateTime, Utc};
use smallvec::SmallVec;
use std::marker::PhantomData;
use std::sync::Arc;

/// Cached list of entities for one domain.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceState<T> {
    /// Server-provided entities, at most one per id
    pub items: Vec<T>,
    /// A request for this slice is in flight
    pub loading: bool,
    /// Message of the last failed operation, cleared when a new one starts
    pub error: Option<String>,
    /// When the list was last replaced by a successful fetch
    pub last_synced: Option<DateTime<Utc>>,
}

impl<T> Default for SliceState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            last_synced: None,
        }
    }
}

impl<T: Entity> SliceState<T> {
    /// Create an idle slice holding `items`
    #[must_use]
    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Look up an entity by id
    #[must_use]
    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether an entity with this id is cached
    #[must_use]
    pub fn contains(&self, id: &T::Id) -> bool {
        self.position(id).is_some()
    }

    /// Number of cached entities
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the slice holds no entities
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: &T::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }
}

/// State transitions of an entity slice.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceAction<T: Entity> {
    /// List request started
    FetchStart,
    /// List request succeeded; replaces `items` wholesale
    FetchSuccess(Vec<T>),
    /// Single-record request succeeded; upserts by id
    FetchOneSuccess(T),
    /// List or single-record request failed
    FetchFailure(String),

    /// Create request started
    CreateStart,
    /// Server acknowledged a created entity
    CreateSuccess(T),
    /// Create request failed
    CreateFailure(String),

    /// Update request started
    UpdateStart,
    /// Server returned the updated entity
    UpdateSuccess(T),
    /// Update request failed
    UpdateFailure(String),

    /// Delete request started
    DeleteStart,
    /// Server confirmed deletion of the entity with this id
    DeleteSuccess(T::Id),
    /// Delete request failed
    DeleteFailure(String),

    /// The caller aborted the in-flight request
    Cancelled,
}

impl<T: Entity> SliceAction<T> {
    /// Short name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FetchStart => "fetch_start",
            Self::FetchSuccess(_) => "fetch_success",
            Self::FetchOneSuccess(_) => "fetch_one_success",
            Self::FetchFailure(_) => "fetch_failure",
            Self::CreateStart => "create_start",
            Self::CreateSuccess(_) => "create_success",
            Self::CreateFailure(_) => "create_failure",
            Self::UpdateStart => "update_start",
            Self::UpdateSuccess(_) => "update_success",
            Self::UpdateFailure(_) => "update_failure",
            Self::DeleteStart => "delete_start",
            Self::DeleteSuccess(_) => "delete_success",
            Self::DeleteFailure(_) => "delete_failure",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Pure reducer shared by every entity slice.
///
/// Update and delete for an id that is not cached leave `items` untouched:
/// the list is merely stale, which is not an error.
pub struct SliceReducer<T> {
    _entity: PhantomData<fn() -> T>,
}

impl<T> SliceReducer<T> {
    /// Creates a new `SliceReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<T> Default for SliceReducer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SliceReducer<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SliceReducer<T> {}

impl<T> std::fmt::Debug for SliceReducer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SliceReducer")
    }
}

impl<T: Entity> Reducer for SliceReducer<T> {
    type State = SliceState<T>;
    type Action = SliceAction<T>;
    type Environment = Arc<dyn Clock>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        clock: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SliceAction::FetchStart
            | SliceAction::CreateStart
            | SliceAction::UpdateStart
            | SliceAction::DeleteStart => state.begin(),

            SliceAction::FetchSuccess(items) => {
                state.items = items;
                state.loading = false;
                state.last_synced = Some(clock.now());
            },
            SliceAction::FetchOneSuccess(entity) => {
                match state.position(entity.id()) {
                    Some(index) => state.items[index] = entity,
                    None => state.items.push(entity),
                }
                state.loading = false;
            },
            SliceAction::CreateSuccess(entity) => {
                // A concurrent fetch may already have brought the record in.
                if let Some(index) = state.position(entity.id()) {
                    state.items.remove(index);
                }
                state.items.push(entity);
                state.loading = false;
            },
            SliceAction::UpdateSuccess(entity) => {
                if let Some(index) = state.position(entity.id()) {
                    state.items[index] = entity;
                }
                state.loading = false;
            },
            SliceAction::DeleteSuccess(id) => {
                state.items.retain(|item| item.id() != &id);
                state.loading = false;
            },

            SliceAction::FetchFailure(message)
            | SliceAction::CreateFailure(message)
            | SliceAction::UpdateFailure(message)
            | SliceAction::DeleteFailure(message) => state.fail(message),

            SliceAction::Cancelled => state.loading = false,
        }

        SmallVec::new()
    }
}
