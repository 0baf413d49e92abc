//! StaffDesk API client implementation

use crate::config::ClientConfig;
use crate::envelope::{Envelope, ErrorBody};
use crate::error::{ApiError, GENERIC_ERROR_MESSAGE, NETWORK_ERROR_MESSAGE};
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::session::{NoopSessionListener, SessionListener};
use crate::storage::{DurableStorage, TOKEN_KEY};
use reqwest::multipart::Form;
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Request body variants
enum Body {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// StaffDesk API client
///
/// Cheap to clone; clones share the connection pool, cookie jar and
/// collaborators.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: Arc<ClientConfig>,
    storage: Arc<dyn DurableStorage>,
    notifier: Arc<dyn Notifier>,
    session: Arc<dyn SessionListener>,
}

impl ApiClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if the base URL does not parse or
    /// the HTTP client cannot be built.
    pub fn new(
        config: ClientConfig,
        storage: Arc<dyn DurableStorage>,
        notifier: Arc<dyn Notifier>,
        session: Arc<dyn SessionListener>,
    ) -> Result<Self, ApiError> {
        Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("base URL `{}`: {e}", config.base_url)))?;

        let mut builder = Client::builder().cookie_store(config.with_credentials);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            http,
            config: Arc::new(config),
            storage,
            notifier,
            session,
        })
    }

    /// A clone whose failures are only logged
    ///
    /// For best-effort calls: no notification is shown and a rejected session
    /// does not reach the session listener. The token is still cleared on
    /// expiry.
    #[must_use]
    pub fn silent(&self) -> Self {
        Self {
            notifier: Arc::new(TracingNotifier),
            session: Arc::new(NoopSessionListener),
            ..self.clone()
        }
    }

    /// The configuration this client was built with
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Durable storage holding the token
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn DurableStorage> {
        &self.storage
    }

    /// The bearer token currently persisted, if any
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if storage cannot be read.
    pub fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    /// Persist the bearer token attached to subsequent requests
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if storage cannot be written.
    pub fn set_token(&self, token: &str) -> Result<(), ApiError> {
        Ok(self.storage.set(TOKEN_KEY, token)?)
    }

    /// Forget the bearer token
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if storage cannot be written.
    pub fn clear_token(&self) -> Result<(), ApiError> {
        Ok(self.storage.remove(TOKEN_KEY)?)
    }

    /// `GET path`
    ///
    /// # Errors
    ///
    /// See [`ApiError`]; every variant except `InvalidRequest`, `Decode` and
    /// `Storage` has already been reported to the notifier or session listener.
    pub async fn get(&self, path: &str) -> Result<Envelope, ApiError> {
        self.execute(Method::GET, path, Body::Empty).await
    }

    /// `POST path` with a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Envelope, ApiError> {
        self.execute(Method::POST, path, Body::Json(to_json(body)?)).await
    }

    /// `PUT path` with a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Envelope, ApiError> {
        self.execute(Method::PUT, path, Body::Json(to_json(body)?)).await
    }

    /// `DELETE path`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn delete(&self, path: &str) -> Result<Envelope, ApiError> {
        self.execute(Method::DELETE, path, Body::Empty).await
    }

    /// `POST path` with a multipart body (file uploads)
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<Envelope, ApiError> {
        self.execute(Method::POST, path, Body::Multipart(form)).await
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ApiError::InvalidRequest(format!("`{joined}`: {e}")))
    }

    #[tracing::instrument(skip(self, body), name = "api_request")]
    async fn execute(&self, method: Method, path: &str, body: Body) -> Result<Envelope, ApiError> {
        let url = self.url(path)?;

        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = self.token()? {
            request = request.bearer_auth(token);
        }
        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(&value),
            Body::Multipart(form) => request.multipart(form),
        };

        let start = Instant::now();
        let sent = request.send().await;
        metrics::histogram!("api_request_duration_seconds").record(start.elapsed().as_secs_f64());

        let response = match sent {
            Ok(response) => response,
            Err(e) if e.is_builder() => return Err(ApiError::InvalidRequest(e.to_string())),
            Err(e) => {
                metrics::counter!("api_requests_total", "method" => method.as_str().to_owned(), "status" => "network_error")
                    .increment(1);
                tracing::warn!(error = %e, "Request failed before a response arrived");
                self.notifier.notify(Notification::error(NETWORK_ERROR_MESSAGE)).await;
                return Err(ApiError::Network(e.to_string()));
            },
        };

        let status = response.status();
        metrics::counter!("api_requests_total", "method" => method.as_str().to_owned(), "status" => status.as_str().to_owned())
            .increment(1);

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, %status, "Response body was cut off");
                self.notifier.notify(Notification::error(NETWORK_ERROR_MESSAGE)).await;
                return Err(ApiError::Network(e.to_string()));
            },
        };

        if status.is_success() {
            let envelope = Envelope::from_slice(&bytes)?;
            if envelope.success() {
                tracing::debug!(%status, "Request succeeded");
                return Ok(envelope);
            }
            let error = ErrorBody {
                message: envelope.message().map(ToString::to_string),
                code: envelope.code().map(ToString::to_string),
            };
            return self.fail(status, error).await;
        }

        let error = ErrorBody::from_slice(&bytes);
        self.fail(status, error).await
    }

    async fn fail(&self, status: StatusCode, error: ErrorBody) -> Result<Envelope, ApiError> {
        let message = error
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

        let body = ErrorBody {
            message: Some(message.clone()),
            code: error.code,
        };

        if self.config.session.is_expired(status.as_u16(), &body) {
            metrics::counter!("api_session_expired_total").increment(1);
            tracing::warn!(code = ?body.code, %message, "Session rejected by server; logging out");

            // The session is over either way; a storage failure must not
            // keep the listener from running.
            if let Err(e) = self.clear_token() {
                tracing::error!(error = %e, "Failed to clear persisted token");
            }
            self.session.session_expired().await;

            return Err(ApiError::SessionExpired { message });
        }

        tracing::info!(%status, code = ?body.code, %message, "Request rejected by server");
        self.notifier.notify(Notification::error(message.clone())).await;

        Err(ApiError::Api {
            status: status.as_u16(),
            message,
            code: body.code,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(format!("request body: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn client(base_url: &str) -> Result<ApiClient, ApiError> {
        ApiClient::new(
            ClientConfig::new(base_url),
            Arc::new(MemoryStorage::new()),
            Arc::new(TracingNotifier),
            Arc::new(NoopSessionListener),
        )
    }

    #[test]
    fn joins_paths_without_doubling_slashes() {
        let client = client("http://localhost:5000/api/").unwrap();

        assert_eq!(client.url("/tasks").unwrap().as_str(), "http://localhost:5000/api/tasks");
        assert_eq!(client.url("leave/employee").unwrap().as_str(), "http://localhost:5000/api/leave/employee");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(client("not a url"), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn token_round_trips_through_storage() {
        let client = client("http://localhost:5000/api").unwrap();

        assert_eq!(client.token().unwrap(), None);
        client.set_token("abc").unwrap();
        assert_eq!(client.token().unwrap().as_deref(), Some("abc"));
        client.clear_token().unwrap();
        assert_eq!(client.token().unwrap(), None);
    }
}
