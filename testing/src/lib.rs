//! # StaffDesk Testing
//!
//! Testing utilities and helpers for the StaffDesk client.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - Recording doubles for the HTTP client's collaborators
//! - Property-based testing strategies
//! - Assertion helpers for reducers
//!
//! ## Example
//!
//! ```ignore
//! use staffdesk_testing::{RecordingNotifier, RecordingSessionListener};
//!
//! #[tokio::test]
//! async fn test_delete_forbidden() {
//!     let notifier = Arc::new(RecordingNotifier::new());
//!     let session = Arc::new(RecordingSessionListener::new());
//!     let client = ApiClient::new(config, storage, notifier.clone(), session.clone())?;
//!
//!     let _ = client.delete("/tasks/t1").await;
//!
//!     assert_eq!(notifier.messages(), vec!["Not authorized"]);
//!     assert_eq!(session.calls(), 0);
//! }
//! ```

use chrono::{DateTime, Utc};
use staffdesk_core::environment::Clock;

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use futures::future::BoxFuture;
    use staffdesk_client::{Notification, NotificationKind, Notifier, SessionListener};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use staffdesk_testing::mocks::FixedClock;
    /// use staffdesk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }

    /// Notifier that remembers every notification it was asked to show
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        seen: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        /// Create an empty recorder
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Every notification so far, in order
        #[must_use]
        pub fn notifications(&self) -> Vec<Notification> {
            self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
        }

        /// Messages of every notification so far, in order
        #[must_use]
        pub fn messages(&self) -> Vec<String> {
            self.notifications().into_iter().map(|n| n.message).collect()
        }

        /// Number of notifications of `kind`
        #[must_use]
        pub fn count(&self, kind: NotificationKind) -> usize {
            self.notifications().iter().filter(|n| n.kind == kind).count()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) -> BoxFuture<'_, ()> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(notification);
            }
            Box::pin(async {})
        }
    }

    /// Session listener that counts expiries
    #[derive(Debug, Default)]
    pub struct RecordingSessionListener {
        calls: AtomicUsize,
    }

    impl RecordingSessionListener {
        /// Create a listener that has not been called
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// How many times the session was reported expired
        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SessionListener for RecordingSessionListener {
        fn session_expired(&self) -> BoxFuture<'_, ()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {})
        }
    }
}

/// Test helpers and utilities.
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Route `tracing` output to the test harness
    ///
    /// Safe to call from every test; only the first call installs the
    /// subscriber. Honors `RUST_LOG`, defaulting to `warn`.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Server-style identifiers (24 lowercase hex digits, like `_id`)
    pub fn object_id() -> impl Strategy<Value = String> {
        "[0-9a-f]{24}"
    }

    /// Human-readable messages as a server would send them
    pub fn message() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z ]{0,40}"
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, RecordingNotifier, RecordingSessionListener, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use staffdesk_client::{Notification, NotificationKind, Notifier, SessionListener};

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();

        tokio_test::block_on(notifier.notify(Notification::error("first")));
        tokio_test::block_on(notifier.notify(Notification::success("second")));

        assert_eq!(notifier.messages(), vec!["first", "second"]);
        assert_eq!(notifier.count(NotificationKind::Error), 1);
        assert_eq!(notifier.count(NotificationKind::Success), 1);
    }

    #[test]
    fn recording_session_listener_counts_calls() {
        let listener = RecordingSessionListener::new();

        tokio_test::block_on(listener.session_expired());
        tokio_test::block_on(listener.session_expired());

        assert_eq!(listener.calls(), 2);
    }
}
