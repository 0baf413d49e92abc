use super::{HookContext, HookError};
use crate::auth::{AuthAction, AuthState};
use crate::entities::User;
use crate::navigation::{Navigator, Route};
use crate::state::AppAction;
use serde_json::json;
use staffdesk_client::{ApiError, Notification};
use std::sync::Arc;

/// Sign-in, sign-out and profile
#[derive(Clone)]
pub struct AuthHook {
    ctx: HookContext,
    navigator: Arc<dyn Navigator>,
}

impl AuthHook {
    /// Hook over `ctx`, moving the user with `navigator`
    #[must_use]
    pub fn new(ctx: HookContext, navigator: Arc<dyn Navigator>) -> Self {
        Self { ctx, navigator }
    }

    /// Snapshot of the auth slice
    pub async fn snapshot(&self) -> AuthState {
        self.ctx.store.state(|s| s.auth.clone()).await
    }

    /// `POST /auth/login`
    ///
    /// Stores the issued token, signs the user in and opens the dashboard.
    /// Rejected credentials are an ordinary failure: the slice records the
    /// message and `None` is returned.
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<User>, HookError> {
        self.dispatch(AuthAction::LoginStart).await?;

        let body = json!({ "email": email, "password": password });
        let signed_in = match self.ctx.client.post("/auth/login", &body).await {
            Ok(envelope) => envelope
                .take::<String>("token")
                .and_then(|token| Ok((token, envelope.take::<User>("user")?)))
                .and_then(|(token, user)| {
                    self.ctx.client.set_token(&token)?;
                    Ok((token, user, envelope.message().map(ToString::to_string)))
                }),
            Err(e) => Err(e),
        };

        let (token, user, message) = match signed_in {
            Ok(signed_in) => signed_in,
            Err(e) => {
                self.fail(e, AuthAction::LoginFailure).await?;
                return Ok(None);
            },
        };

        tracing::info!(user = %user.id, role = %user.role, "Signed in");
        self.dispatch(AuthAction::LoginSuccess {
            token,
            user: user.clone(),
        })
        .await?;
        self.ctx
            .notify(Notification::success(message.unwrap_or_else(|| "Login successful".to_string())))
            .await;
        self.navigator.navigate(Route::Dashboard);
        Ok(Some(user))
    }

    /// Sign out
    ///
    /// `POST /auth/logout` is best effort: whatever the server answers, the
    /// token is cleared, the slice reset and the user sent to the login view.
    ///
    /// # Errors
    ///
    /// Only for a shut-down store.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), HookError> {
        if let Err(e) = self.ctx.client.silent().post("/auth/logout", &json!({})).await {
            tracing::debug!(error = %e, "Server-side logout failed");
        }
        if let Err(e) = self.ctx.client.clear_token() {
            tracing::warn!(error = %e, "Could not clear stored token");
        }

        self.dispatch(AuthAction::Logout).await?;
        self.navigator.redirect(Route::Login);
        tracing::info!("Signed out");
        Ok(())
    }

    /// `GET /auth/me`: refresh the signed-in user's record
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_profile(&self) -> Result<Option<User>, HookError> {
        let fetched = match self.ctx.client.get("/auth/me").await {
            Ok(envelope) => envelope.take::<User>("user"),
            Err(e) => Err(e),
        };

        match fetched {
            Ok(user) => {
                self.dispatch(AuthAction::ProfileLoaded(user.clone())).await?;
                Ok(Some(user))
            },
            Err(e) => {
                self.fail(e, AuthAction::ProfileFailure).await?;
                Ok(None)
            },
        }
    }

    async fn fail(&self, error: ApiError, failure: fn(String) -> AuthAction) -> Result<(), HookError> {
        tracing::warn!(error = %error, "Request failed");
        let action = AppAction::Auth(failure(error.message()));
        self.ctx.report(error, action).await
    }

    async fn dispatch(&self, action: AuthAction) -> Result<(), HookError> {
        self.ctx.dispatch(AppAction::Auth(action)).await
    }
}
