//! Store-backed implementations of the HTTP client's collaborators.

use crate::auth::AuthAction;
use crate::navigation::{Navigator, Route};
use crate::state::AppAction;
use crate::toast::ToastAction;
use crate::AppStore;
use futures::future::BoxFuture;
use staffdesk_client::{Notification, NotificationKind, Notifier, SessionListener};
use std::sync::Arc;

/// Turns a rejected session into a logged-out client
///
/// Resets the auth slice (which persists the logged-out snapshot) and sends
/// the user to the login view unless they are already there.
#[derive(Clone)]
pub struct SessionGuard {
    store: AppStore,
    navigator: Arc<dyn Navigator>,
}

impl SessionGuard {
    /// Guard dispatching into `store`
    #[must_use]
    pub fn new(store: AppStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }
}

impl SessionListener for SessionGuard {
    fn session_expired(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if let Err(e) = self.store.send(AppAction::Auth(AuthAction::SessionExpired)).await {
                tracing::warn!(error = %e, "Could not reset auth state after session expiry");
            }
            if self.navigator.redirect(Route::Login) {
                tracing::info!("Session expired; redirected to login");
            }
        })
    }
}

/// Shows notifications as toasts in the store
#[derive(Clone)]
pub struct ToastNotifier {
    store: AppStore,
}

impl ToastNotifier {
    /// Notifier dispatching into `store`
    #[must_use]
    pub const fn new(store: AppStore) -> Self {
        Self { store }
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, notification: Notification) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            match notification.kind {
                NotificationKind::Error => tracing::warn!(message = %notification.message, "toast"),
                NotificationKind::Success | NotificationKind::Info => {
                    tracing::info!(kind = %notification.kind, message = %notification.message, "toast");
                },
            }

            let action = AppAction::Toast(ToastAction::Show {
                kind: notification.kind,
                message: notification.message,
            });
            if let Err(e) = self.store.send(action).await {
                tracing::debug!(error = %e, "Toast dropped");
            }
        })
    }
}
