//! Client configuration.

use crate::session::SessionPolicy;
use std::time::Duration;

/// Settings for [`crate::ApiClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every request path is appended to (e.g. `http://host/api`)
    pub base_url: String,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Keep and resend cookies set by the server
    pub with_credentials: bool,
    /// How 401 responses are classified
    pub session: SessionPolicy,
}

impl ClientConfig {
    /// Config for `base_url` with no timeout, cookies on and the default
    /// session policy
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
            with_credentials: true,
            session: SessionPolicy::default(),
        }
    }

    /// Set a request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the session policy
    #[must_use]
    pub fn with_session_policy(mut self, session: SessionPolicy) -> Self {
        self.session = session;
        self
    }
}
