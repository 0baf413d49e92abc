//! Error types for the StaffDesk API client

use crate::storage::StorageError;
use thiserror::Error;

/// Message shown for transport failures (no response at all)
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Message shown when an error response carries no `message`
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

/// Errors that can occur when talking to the StaffDesk API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the session token
    ///
    /// The token has already been cleared and the session listener told.
    #[error("Session expired: {message}")]
    SessionExpired {
        /// Message from the response body
        message: String,
    },

    /// API returned an error status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
        /// Machine-readable code, when the server sent one
        code: Option<String>,
    },

    /// No response was received
    #[error("Request failed: {0}")]
    Network(String),

    /// A success response could not be decoded
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// The request could not be built (bad URL, bad header)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reading or clearing the persisted token failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Human-readable message for display
    ///
    /// The server's message when there is one, otherwise the transport or
    /// decoding error text.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::SessionExpired { message } | Self::Api { message, .. } => message.clone(),
            Self::Network(message) | Self::Decode(message) | Self::InvalidRequest(message) => {
                message.clone()
            },
            Self::Storage(e) => e.to_string(),
        }
    }

    /// HTTP status of the failed response, if one was received
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::SessionExpired { .. } => Some(401),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error is a forced logout
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// Whether callers should propagate instead of reporting through state
    ///
    /// Request construction failures are programming or configuration
    /// errors, not expected runtime outcomes.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_server_text() {
        let error = ApiError::Api {
            status: 403,
            message: "Not authorized".to_string(),
            code: None,
        };
        assert_eq!(error.message(), "Not authorized");
        assert_eq!(error.status(), Some(403));
        assert!(!error.is_session_expired());
    }

    #[test]
    fn network_error_has_no_status() {
        let error = ApiError::Network("connection refused".to_string());
        assert_eq!(error.status(), None);
        assert_eq!(error.message(), "connection refused");
        assert!(!error.is_fatal());
    }

    #[test]
    fn only_request_construction_is_fatal() {
        assert!(ApiError::InvalidRequest("relative URL".to_string()).is_fatal());
        assert!(
            !ApiError::SessionExpired {
                message: "Invalid token".to_string()
            }
            .is_fatal()
        );
    }
}
