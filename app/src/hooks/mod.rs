//! Data-access hooks: imperative operations per domain.
//!
//! Every operation follows the same protocol: dispatch `*Start`, make one
//! HTTP call, then dispatch `*Success` or `*Failure`. Expected failures
//! (server errors, network errors, an expired session) are reported
//! through the slice and a notification, and the operation returns a falsy
//! value. Only request construction errors and a shut-down store come
//! back as `Err`.

mod attendance;
mod auth;
mod leaves;
mod onboarding;
mod resource;
mod tasks;
mod users;

pub use auth::AuthHook;
pub use onboarding::Attachment;
pub use resource::ResourceHook;

use crate::AppStore;
use crate::entities::{Attendance, Candidate, Leave, Task, User};
use crate::navigation::Navigator;
use crate::state::AppAction;
use staffdesk_client::{ApiClient, ApiError, Notification, Notifier};
use staffdesk_runtime::StoreError;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Errors a hook propagates instead of reporting through state
#[derive(Debug, Error)]
pub enum HookError {
    /// The request could not be built
    #[error(transparent)]
    Request(#[from] ApiError),

    /// The store refused the dispatch (shutting down)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A spawned operation panicked
    #[error("Operation task failed: {0}")]
    Join(String),
}

/// What every hook needs: the HTTP client, the store and the notifier
#[derive(Clone)]
pub struct HookContext {
    /// Authenticated HTTP client
    pub client: ApiClient,
    /// Application store
    pub store: AppStore,
    /// Where success and failure messages go
    pub notifier: Arc<dyn Notifier>,
}

impl HookContext {
    /// Bundle the collaborators
    #[must_use]
    pub fn new(client: ApiClient, store: AppStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            store,
            notifier,
        }
    }

    pub(crate) async fn dispatch(&self, action: AppAction) -> Result<(), HookError> {
        self.store.send(action).await?;
        Ok(())
    }

    pub(crate) async fn notify(&self, notification: Notification) {
        self.notifier.notify(notification).await;
    }

    /// Dispatch `failure` and notify, or hand back errors callers must see
    pub(crate) async fn report(&self, error: ApiError, failure: AppAction) -> Result<(), HookError> {
        self.dispatch(failure).await?;

        if error.is_fatal() {
            return Err(error.into());
        }
        // A forced logout speaks for itself.
        if !error.is_session_expired() {
            self.notify(Notification::error(error.message())).await;
        }
        Ok(())
    }
}

/// A hook operation running on its own task
///
/// Returned by [`ResourceHook::cancellable`].
pub struct Operation<T> {
    task: JoinHandle<Result<T, HookError>>,
    store: AppStore,
    on_cancel: AppAction,
}

impl<T> Operation<T> {
    pub(crate) fn spawn<F>(store: AppStore, on_cancel: AppAction, operation: F) -> Self
    where
        F: Future<Output = Result<T, HookError>> + Send + 'static,
        T: Send + 'static,
    {
        Self {
            task: tokio::spawn(operation),
            store,
            on_cancel,
        }
    }

    /// Whether the operation has finished (or been cancelled)
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Abort the in-flight request and settle the slice
    ///
    /// Clears the slice's `loading` flag. Does nothing if the operation
    /// already finished.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Store`] if the store is shutting down.
    pub async fn cancel(&self) -> Result<(), HookError> {
        if self.task.is_finished() {
            return Ok(());
        }

        self.task.abort();
        tracing::debug!(action = %self.on_cancel.name(), "Operation cancelled");
        self.store.send(self.on_cancel.clone()).await?;
        Ok(())
    }

    /// Wait for the result; `None` if the operation was cancelled
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, or [`HookError::Join`] if it panicked.
    pub async fn join(self) -> Result<Option<T>, HookError> {
        match self.task.await {
            Ok(result) => result.map(Some),
            Err(e) if e.is_cancelled() => Ok(None),
            Err(e) => Err(HookError::Join(e.to_string())),
        }
    }
}

/// One hook per domain
#[derive(Clone)]
pub struct Hooks {
    /// Sign-in and profile
    pub auth: AuthHook,
    /// Tasks
    pub tasks: ResourceHook<Task>,
    /// Leave requests
    pub leaves: ResourceHook<Leave>,
    /// Attendance
    pub attendance: ResourceHook<Attendance>,
    /// User administration
    pub users: ResourceHook<User>,
    /// Onboarding candidates
    pub onboarding: ResourceHook<Candidate>,
}

impl Hooks {
    /// Build every hook over the same context
    #[must_use]
    pub fn new(ctx: &HookContext, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth: AuthHook::new(ctx.clone(), navigator),
            tasks: ResourceHook::new(ctx.clone()),
            leaves: ResourceHook::new(ctx.clone()),
            attendance: ResourceHook::new(ctx.clone()),
            users: ResourceHook::new(ctx.clone()),
            onboarding: ResourceHook::new(ctx.clone()),
        }
    }
}
