//! The generic hook shared by every entity resource.

use super::{HookContext, HookError, Operation};
use crate::entities::EntityId;
use crate::resource::Resource;
use serde_json::{Map, Value};
use staffdesk_client::{ApiError, Envelope, Notification};
use staffdesk_core::slice::{SliceAction, SliceState};
use std::future::Future;
use std::marker::PhantomData;

/// Which slice transitions a mutating request drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mutation {
    Create,
    Update,
}

impl Mutation {
    fn start<R: Resource>(self) -> SliceAction<R> {
        match self {
            Self::Create => SliceAction::CreateStart,
            Self::Update => SliceAction::UpdateStart,
        }
    }

    fn success<R: Resource>(self, entity: R) -> SliceAction<R> {
        match self {
            Self::Create => SliceAction::CreateSuccess(entity),
            Self::Update => SliceAction::UpdateSuccess(entity),
        }
    }

    fn failure<R: Resource>(self, message: String) -> SliceAction<R> {
        match self {
            Self::Create => SliceAction::CreateFailure(message),
            Self::Update => SliceAction::UpdateFailure(message),
        }
    }
}

/// CRUD operations on one resource, keeping its slice in sync
pub struct ResourceHook<R> {
    pub(crate) ctx: HookContext,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceHook<R> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceHook<R> {
    /// Hook over `ctx`
    #[must_use]
    pub const fn new(ctx: HookContext) -> Self {
        Self {
            ctx,
            _resource: PhantomData,
        }
    }

    /// Snapshot of the resource's slice
    pub async fn snapshot(&self) -> SliceState<R> {
        self.ctx.store.state(|s| R::slice(s).clone()).await
    }

    /// `GET /resource`: replace the cached list
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self), fields(resource = R::LABEL))]
    pub async fn fetch_all(&self) -> Result<bool, HookError> {
        self.fetch_list(R::PATH).await
    }

    /// `GET /resource/:id`: refresh or add one record
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self), fields(resource = R::LABEL))]
    pub async fn fetch_one(&self, id: &EntityId) -> Result<Option<R>, HookError> {
        let Some(envelope) = self
            .request(SliceAction::FetchStart, self.ctx.client.get(&R::item_path(id)?), SliceAction::FetchFailure)
            .await?
        else {
            return Ok(None);
        };

        match envelope.take::<R>(R::ITEM_KEY) {
            Ok(entity) => {
                self.dispatch(SliceAction::FetchOneSuccess(entity.clone())).await?;
                Ok(Some(entity))
            },
            Err(e) => self.fail(e, SliceAction::FetchFailure).await.map(|()| None),
        }
    }

    /// `POST /resource`: append the server's record
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self, payload), fields(resource = R::LABEL))]
    pub async fn create(&self, payload: Map<String, Value>) -> Result<Option<R>, HookError> {
        self.mutate(
            Mutation::Create,
            self.ctx.client.post(R::PATH, &payload),
            format!("{} created successfully", R::LABEL),
        )
        .await
    }

    /// `PUT /resource/:id`: replace the cached record
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self, payload), fields(resource = R::LABEL))]
    pub async fn update(&self, id: &EntityId, payload: Map<String, Value>) -> Result<Option<R>, HookError> {
        self.mutate(
            Mutation::Update,
            self.ctx.client.put(&R::item_path(id)?, &payload),
            format!("{} updated successfully", R::LABEL),
        )
        .await
    }

    /// `DELETE /resource/:id`: drop the cached record
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self), fields(resource = R::LABEL))]
    pub async fn remove(&self, id: &EntityId) -> Result<bool, HookError> {
        let Some(envelope) = self
            .request(
                SliceAction::DeleteStart,
                self.ctx.client.delete(&R::item_path(id)?),
                SliceAction::DeleteFailure,
            )
            .await?
        else {
            return Ok(false);
        };

        self.dispatch(SliceAction::DeleteSuccess(id.clone())).await?;
        self.succeed(&envelope, format!("{} deleted successfully", R::LABEL)).await;
        Ok(true)
    }

    /// Run `operation` on its own task so it can be cancelled
    ///
    /// Cancelling aborts the request and dispatches `Cancelled` into this
    /// resource's slice.
    ///
    /// ```ignore
    /// let hook = hooks.tasks.clone();
    /// let op = hooks.tasks.cancellable(async move { hook.fetch_all().await });
    /// op.cancel().await?;
    /// assert_eq!(op.join().await?, None);
    /// ```
    pub fn cancellable<T, F>(&self, operation: F) -> Operation<T>
    where
        F: Future<Output = Result<T, HookError>> + Send + 'static,
        T: Send + 'static,
    {
        Operation::spawn(self.ctx.store.clone(), R::action(SliceAction::Cancelled), operation)
    }

    /// `GET path` whose list lives under [`Resource::LIST_KEY`]
    pub(crate) async fn fetch_list(&self, path: &str) -> Result<bool, HookError> {
        let Some(envelope) = self
            .request(SliceAction::FetchStart, self.ctx.client.get(path), SliceAction::FetchFailure)
            .await?
        else {
            return Ok(false);
        };

        self.settle_list(&envelope).await
    }

    /// Dispatch `FetchSuccess` with the list in `envelope`
    pub(crate) async fn settle_list(&self, envelope: &Envelope) -> Result<bool, HookError> {
        match envelope.take::<Vec<R>>(R::LIST_KEY) {
            Ok(items) => {
                tracing::debug!(count = items.len(), "Fetched");
                self.dispatch(SliceAction::FetchSuccess(items)).await?;
                Ok(true)
            },
            Err(e) => self.fail(e, SliceAction::FetchFailure).await.map(|()| false),
        }
    }

    /// Create or update through `request`; the record is under
    /// [`Resource::ITEM_KEY`]
    pub(crate) async fn mutate<F>(
        &self,
        mutation: Mutation,
        request: F,
        fallback_message: String,
    ) -> Result<Option<R>, HookError>
    where
        F: Future<Output = Result<Envelope, ApiError>>,
    {
        let Some(envelope) = self
            .request(mutation.start(), request, |message| mutation.failure(message))
            .await?
        else {
            return Ok(None);
        };

        match envelope.take::<R>(R::ITEM_KEY) {
            Ok(entity) => {
                self.dispatch(mutation.success(entity.clone())).await?;
                self.succeed(&envelope, fallback_message).await;
                Ok(Some(entity))
            },
            Err(e) => self.fail(e, |message| mutation.failure(message)).await.map(|()| None),
        }
    }

    /// Dispatch `start`, await `request`, report a failure
    pub(crate) async fn request<F>(
        &self,
        start: SliceAction<R>,
        request: F,
        failure: impl FnOnce(String) -> SliceAction<R>,
    ) -> Result<Option<Envelope>, HookError>
    where
        F: Future<Output = Result<Envelope, ApiError>>,
    {
        self.dispatch(start).await?;

        match request.await {
            Ok(envelope) => Ok(Some(envelope)),
            Err(e) => self.fail(e, failure).await.map(|()| None),
        }
    }

    async fn fail(
        &self,
        error: ApiError,
        failure: impl FnOnce(String) -> SliceAction<R>,
    ) -> Result<(), HookError> {
        tracing::warn!(error = %error, "Request failed");
        let action = R::action(failure(error.message()));
        self.ctx.report(error, action).await
    }

    async fn succeed(&self, envelope: &Envelope, fallback_message: String) {
        let message = envelope.message().map_or(fallback_message, ToString::to_string);
        self.ctx.notify(Notification::success(message)).await;
    }

    pub(crate) async fn dispatch(&self, action: SliceAction<R>) -> Result<(), HookError> {
        self.ctx.dispatch(R::action(action)).await
    }
}
