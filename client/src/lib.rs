//! # StaffDesk Client
//!
//! Authenticated HTTP access to the StaffDesk REST API.
//!
//! [`ApiClient`] attaches the bearer token kept in [`DurableStorage`],
//! decodes the `{ success, <key>: payload, message }` envelope and
//! centralizes failure handling:
//!
//! - an expired or invalid session clears the token and tells the
//!   [`SessionListener`] (no notification is shown)
//! - any other error response raises a [`Notification`] with the server
//!   message
//! - a transport failure raises the generic network notification
//!
//! ## Example
//!
//! ```ignore
//! use staffdesk_client::{ApiClient, ClientConfig, MemoryStorage, TracingNotifier};
//!
//! let client = ApiClient::new(
//!     ClientConfig::new("http://localhost:5000/api"),
//!     Arc::new(MemoryStorage::new()),
//!     Arc::new(TracingNotifier),
//!     session_listener,
//! )?;
//!
//! let envelope = client.get("/tasks").await?;
//! let tasks: Vec<Task> = envelope.take("tasks")?;
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod notify;
pub mod session;
pub mod storage;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use envelope::{Envelope, ErrorBody};
pub use error::ApiError;
pub use notify::{Notification, NotificationKind, Notifier, TracingNotifier};
pub use session::{NoopSessionListener, SessionListener, SessionPolicy};
pub use storage::{DurableStorage, FileStorage, MemoryStorage, StorageError, TOKEN_KEY};

// Re-exported so callers can build multipart bodies without naming reqwest.
pub use reqwest::multipart;
