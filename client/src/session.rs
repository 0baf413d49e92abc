//! Session-expiry detection and the hook that reacts to it.

use crate::envelope::ErrorBody;
use futures::future::BoxFuture;

/// Codes the server uses for a token that is no longer accepted
pub const DEFAULT_EXPIRY_CODES: [&str; 3] = ["TOKEN_EXPIRED", "TOKEN_INVALID", "TOKEN_MISSING"];

/// Reacts to a forced logout
///
/// Called by the client after it has cleared the persisted token and
/// before it returns `ApiError::SessionExpired` to the caller.
pub trait SessionListener: Send + Sync {
    /// The server rejected the session
    fn session_expired(&self) -> BoxFuture<'_, ()>;
}

/// Listener that ignores expiry (the token is still cleared)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSessionListener;

impl SessionListener for NoopSessionListener {
    fn session_expired(&self) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }
}

/// Decides whether a 401 response means the session is over.
///
/// A 401 whose body carries one of `expiry_codes` is an expiry. Servers
/// that predate the `code` field are matched on their message instead
/// (contains "token", case-insensitive) while `legacy_message_match` is on.
/// Any other 401, such as a wrong password at login, is an ordinary error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Machine-readable codes that mean the session is over
    pub expiry_codes: Vec<String>,
    /// Fall back to message matching when the body has no code
    pub legacy_message_match: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            expiry_codes: DEFAULT_EXPIRY_CODES.iter().map(ToString::to_string).collect(),
            legacy_message_match: true,
        }
    }
}

impl SessionPolicy {
    /// Classify an error response
    #[must_use]
    pub fn is_expired(&self, status: u16, body: &ErrorBody) -> bool {
        if status != 401 {
            return false;
        }

        match body.code.as_deref() {
            Some(code) => self.expiry_codes.iter().any(|c| c == code),
            None => {
                self.legacy_message_match
                    && body
                        .message
                        .as_deref()
                        .is_some_and(|m| m.to_lowercase().contains("token"))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(message: Option<&str>, code: Option<&str>) -> ErrorBody {
        ErrorBody {
            message: message.map(ToString::to_string),
            code: code.map(ToString::to_string),
        }
    }

    #[test]
    fn structured_code_decides() {
        let policy = SessionPolicy::default();

        assert!(policy.is_expired(401, &body(Some("whatever"), Some("TOKEN_EXPIRED"))));
        assert!(!policy.is_expired(401, &body(Some("Invalid token"), Some("BAD_CREDENTIALS"))));
    }

    #[test]
    fn legacy_message_match_is_case_insensitive() {
        let policy = SessionPolicy::default();

        assert!(policy.is_expired(401, &body(Some("Invalid token"), None)));
        assert!(policy.is_expired(401, &body(Some("TOKEN has expired"), None)));
        assert!(!policy.is_expired(401, &body(Some("Invalid credentials"), None)));
        assert!(!policy.is_expired(401, &body(None, None)));
    }

    #[test]
    fn legacy_match_can_be_disabled() {
        let policy = SessionPolicy {
            legacy_message_match: false,
            ..SessionPolicy::default()
        };

        assert!(!policy.is_expired(401, &body(Some("Invalid token"), None)));
        assert!(policy.is_expired(401, &body(None, Some("TOKEN_MISSING"))));
    }

    #[test]
    fn other_statuses_never_expire() {
        let policy = SessionPolicy::default();

        assert!(!policy.is_expired(403, &body(Some("Invalid token"), Some("TOKEN_EXPIRED"))));
    }
}
