//! Authentication slice.
//!
//! The only slice that survives a restart: every transition that changes
//! who is signed in writes a snapshot to durable storage under
//! [`PERSIST_KEY`], and [`AuthAction::Rehydrate`] restores it at startup.
//!
//! Snapshot writes run as effects on separate tasks. [`SnapshotWriter`]
//! numbers them while the reducer holds the store lock and drops any write
//! that arrives after a newer one, so storage always ends on the latest
//! transition.

use crate::entities::User;
use crate::reducer::AppEnvironment;
use serde::{Deserialize, Serialize};
use staffdesk_client::DurableStorage;
use staffdesk_core::effect::Effect;
use staffdesk_core::reducer::Reducer;
use staffdesk_core::{SmallVec, smallvec};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Storage key of the auth snapshot
pub const PERSIST_KEY: &str = "persist:auth";

/// Who is signed in
///
/// `loading` and `error` are transient and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    /// Signed-in user
    #[serde(default)]
    pub user: Option<User>,
    /// Bearer token issued at login
    #[serde(default)]
    pub token: Option<String>,
    /// Whether a session is active
    #[serde(default)]
    pub is_authenticated: bool,
    /// A login or profile request is in flight
    #[serde(skip)]
    pub loading: bool,
    /// Last login or profile error
    #[serde(skip)]
    pub error: Option<String>,
}

impl AuthState {
    /// Decode a persisted snapshot
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the snapshot is corrupt.
    pub fn from_snapshot(snapshot: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(snapshot)
    }

    /// Encode the persistent part of the state
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the user record cannot be encoded.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Orders auth snapshot writes
///
/// Generations are issued in reducer order; a write whose generation is not
/// newer than the last one stored is discarded.
pub struct SnapshotWriter {
    storage: Arc<dyn DurableStorage>,
    issued: AtomicU64,
    written: Mutex<u64>,
}

impl SnapshotWriter {
    /// Writer over `storage`
    #[must_use]
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        Self {
            storage,
            issued: AtomicU64::new(0),
            written: Mutex::new(0),
        }
    }

    /// Next generation; must be called in transition order
    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Store `snapshot` unless a newer generation is already stored
    ///
    /// Returns whether the snapshot was written.
    fn write(&self, generation: u64, snapshot: &str) -> bool {
        let Ok(mut written) = self.written.lock() else {
            tracing::error!("Auth snapshot lock poisoned");
            return false;
        };
        if generation <= *written {
            tracing::debug!(generation, latest = *written, "Skipping stale auth snapshot");
            return false;
        }
        match self.storage.set(PERSIST_KEY, snapshot) {
            Ok(()) => {
                *written = generation;
                true
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist auth snapshot");
                false
            },
        }
    }
}

impl std::fmt::Debug for SnapshotWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotWriter")
            .field("issued", &self.issued.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Authentication transitions
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    /// Login request sent
    LoginStart,
    /// Server accepted the credentials
    LoginSuccess {
        /// Issued bearer token
        token: String,
        /// Signed-in user
        user: User,
    },
    /// Login rejected or failed
    LoginFailure(String),
    /// Fresh profile of the signed-in user
    ProfileLoaded(User),
    /// Profile request failed; the session is kept
    ProfileFailure(String),
    /// User signed out
    Logout,
    /// Server rejected the session token
    SessionExpired,
    /// Restore a persisted snapshot at startup
    Rehydrate(AuthState),
}

impl AuthAction {
    /// Short name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LoginStart => "login_start",
            Self::LoginSuccess { .. } => "login_success",
            Self::LoginFailure(_) => "login_failure",
            Self::ProfileLoaded(_) => "profile_loaded",
            Self::ProfileFailure(_) => "profile_failure",
            Self::Logout => "logout",
            Self::SessionExpired => "session_expired",
            Self::Rehydrate(_) => "rehydrate",
        }
    }
}

/// Reducer for [`AuthState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthReducer;

impl Reducer for AuthReducer {
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AuthAction::LoginStart => {
                state.loading = true;
                state.error = None;
                SmallVec::new()
            },
            AuthAction::LoginSuccess { token, user } => {
                *state = AuthState {
                    user: Some(user),
                    token: Some(token),
                    is_authenticated: true,
                    loading: false,
                    error: None,
                };
                smallvec![persist(state, &env.snapshots)]
            },
            AuthAction::LoginFailure(message) => {
                state.loading = false;
                state.error = Some(message);
                SmallVec::new()
            },
            AuthAction::ProfileLoaded(user) => {
                state.user = Some(user);
                state.loading = false;
                state.error = None;
                smallvec![persist(state, &env.snapshots)]
            },
            AuthAction::ProfileFailure(message) => {
                state.loading = false;
                state.error = Some(message);
                SmallVec::new()
            },
            AuthAction::Logout | AuthAction::SessionExpired => {
                *state = AuthState::default();
                smallvec![persist(state, &env.snapshots)]
            },
            AuthAction::Rehydrate(snapshot) => {
                *state = AuthState {
                    loading: false,
                    error: None,
                    ..snapshot
                };
                SmallVec::new()
            },
        }
    }
}

/// Effect writing the snapshot of `state`
fn persist(state: &AuthState, writer: &Arc<SnapshotWriter>) -> Effect<AuthAction> {
    let snapshot = match state.to_snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode auth snapshot");
            return Effect::None;
        },
    };
    let generation = writer.issue();
    let writer = Arc::clone(writer);

    Effect::fire_and_forget(async move {
        writer.write(generation, &snapshot);
    })
}
