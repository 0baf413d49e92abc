//! User-facing transient notifications.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// An operation the user asked for went through
    Success,
    /// An operation failed
    Error,
    /// Neutral information
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        })
    }
}

/// A message to show the user briefly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity
    pub kind: NotificationKind,
    /// Text shown to the user
    pub message: String,
}

impl Notification {
    /// Success notification
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    /// Error notification
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    /// Informational notification
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }
}

/// Surfaces notifications to the user
///
/// Implementations must not fail: a notification that cannot be shown is
/// dropped.
pub trait Notifier: Send + Sync {
    /// Show a notification
    fn notify(&self, notification: Notification) -> BoxFuture<'_, ()>;
}

/// Notifier that only writes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            match notification.kind {
                NotificationKind::Error => tracing::warn!(message = %notification.message, "notification"),
                NotificationKind::Success | NotificationKind::Info => {
                    tracing::info!(kind = %notification.kind, message = %notification.message, "notification");
                },
            }
        })
    }
}
