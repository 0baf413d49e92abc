//! Startup wiring.
//!
//! [`App::bootstrap`] builds the store first, restores the persisted auth
//! snapshot, then hands the store to the collaborators the HTTP client
//! needs ([`ToastNotifier`], [`SessionGuard`]) and to the hooks.

use crate::AppStore;
use crate::auth::{AuthAction, AuthState, PERSIST_KEY, SnapshotWriter};
use crate::config::AppConfig;
use crate::hooks::{HookContext, Hooks};
use crate::navigation::{MemoryNavigator, Navigator};
use crate::reducer::{AppEnvironment, AppReducer};
use crate::session::{SessionGuard, ToastNotifier};
use crate::state::{AppAction, AppState};
use crate::toast::Toast;
use staffdesk_client::{ApiClient, ApiError, DurableStorage, FileStorage, StorageError};
use staffdesk_core::environment::{Clock, SystemClock};
use staffdesk_runtime::{Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Startup failures
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The HTTP client could not be built
    #[error("HTTP client: {0}")]
    Client(#[from] ApiError),

    /// Durable storage could not be read
    #[error("Storage: {0}")]
    Storage(#[from] StorageError),

    /// The restored snapshot could not be dispatched
    #[error("Store: {0}")]
    Store(#[from] StoreError),
}

/// A running client
pub struct App {
    config: AppConfig,
    store: AppStore,
    client: ApiClient,
    hooks: Hooks,
    navigator: Arc<dyn Navigator>,
}

impl App {
    /// Start with file-backed storage, an in-memory navigator and the
    /// system clock
    ///
    /// # Errors
    ///
    /// See [`App::with_parts`].
    pub async fn bootstrap(config: AppConfig) -> Result<Self, BootstrapError> {
        let storage = Arc::new(FileStorage::new(config.storage.path.clone()));
        Self::with_parts(config, storage, Arc::new(MemoryNavigator::default()), Arc::new(SystemClock)).await
    }

    /// Start with the given collaborators
    ///
    /// # Errors
    ///
    /// Returns error if storage cannot be read or the client cannot be
    /// built. A corrupt auth snapshot is logged and ignored.
    #[tracing::instrument(skip_all, fields(environment = %config.environment, api = %config.api.base_url))]
    pub async fn with_parts(
        config: AppConfig,
        storage: Arc<dyn DurableStorage>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BootstrapError> {
        let environment = AppEnvironment {
            clock,
            snapshots: Arc::new(SnapshotWriter::new(Arc::clone(&storage))),
            toast_ttl: config.toasts.ttl(),
        };
        let store = Store::new(AppState::default(), AppReducer::new(), environment);

        match storage.get(PERSIST_KEY)? {
            Some(snapshot) => match AuthState::from_snapshot(&snapshot) {
                Ok(auth) => {
                    tracing::debug!(authenticated = auth.is_authenticated, "Restoring auth snapshot");
                    store.send(AppAction::Auth(AuthAction::Rehydrate(auth))).await?;
                },
                Err(e) => tracing::warn!(error = %e, "Ignoring corrupt auth snapshot"),
            },
            None => tracing::debug!("No auth snapshot"),
        }

        let notifier = Arc::new(ToastNotifier::new(store.clone()));
        let guard = Arc::new(SessionGuard::new(store.clone(), Arc::clone(&navigator)));
        let client = ApiClient::new(config.client_config(), storage, notifier.clone(), guard)?;

        let hooks = Hooks::new(&HookContext::new(client.clone(), store.clone(), notifier), Arc::clone(&navigator));

        tracing::info!("Client ready");
        Ok(Self {
            config,
            store,
            client,
            hooks,
            navigator,
        })
    }

    /// Effective configuration
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Application store
    #[must_use]
    pub const fn store(&self) -> &AppStore {
        &self.store
    }

    /// Authenticated HTTP client
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Data-access hooks
    #[must_use]
    pub const fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Navigator shared with the session guard
    #[must_use]
    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    /// Notifications currently visible
    pub async fn toasts(&self) -> Vec<Toast> {
        self.store.state(|s| s.toasts.active.clone()).await
    }

    /// Stop accepting actions and wait up to `timeout` for pending effects
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects are still running,
    /// e.g. toast dismissals not yet due.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }
}
