//! # StaffDesk
//!
//! Client-side state synchronization for the StaffDesk HR/CRM API.
//!
//! The client keeps a local cache of server-owned records (tasks, leave
//! requests, attendance, users, onboarding candidates) in one [`AppStore`].
//! Each record type lives in a [`SliceState`](staffdesk_core::slice::SliceState)
//! updated only by dispatched actions; the [`hooks`] perform the HTTP calls
//! and dispatch the request lifecycle around them.
//!
//! ## Example
//!
//! ```ignore
//! use staffdesk::{App, AppConfig};
//!
//! let app = App::bootstrap(AppConfig::from_env()?).await?;
//!
//! app.hooks().auth.login("ada@example.com", "secret").await?;
//! app.hooks().tasks.fetch_all().await?;
//!
//! let open = app.store().state(|s| s.tasks.items.len()).await;
//! ```

pub mod app;
pub mod auth;
pub mod config;
pub mod entities;
pub mod hooks;
pub mod navigation;
pub mod reducer;
pub mod resource;
pub mod session;
pub mod state;
pub mod toast;

pub use app::{App, BootstrapError};
pub use config::{AppConfig, ConfigError, Environment};
pub use hooks::{HookContext, HookError, Hooks, Operation, ResourceHook};
pub use navigation::{MemoryNavigator, Navigator, Route};
pub use reducer::{AppEnvironment, AppReducer};
pub use resource::Resource;
pub use state::{AppAction, AppState};

/// The application store
pub type AppStore = staffdesk_runtime::Store<AppState, AppAction, AppEnvironment, AppReducer>;
