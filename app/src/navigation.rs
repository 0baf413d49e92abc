//! Where the user is in the client.

use std::fmt;
use std::sync::Mutex;

/// A view of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Sign-in view
    Login,
    /// Landing view after sign-in
    Dashboard,
    /// Any other view, by path
    Other(String),
}

impl Route {
    /// Path of the view
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Other(path) => path,
        }
    }
}

impl From<&str> for Route {
    fn from(path: &str) -> Self {
        match path {
            "/login" => Self::Login,
            "/dashboard" => Self::Dashboard,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Moves the user between views
pub trait Navigator: Send + Sync {
    /// The current view
    fn current(&self) -> Route;

    /// Go to `route`
    fn navigate(&self, route: Route);

    /// Go to `route` unless already there; returns whether it moved
    ///
    /// Implementations shared between tasks should make the check and the
    /// move a single step.
    fn redirect(&self, route: Route) -> bool {
        if self.current() == route {
            return false;
        }
        self.navigate(route);
        true
    }
}

/// Navigator that records every move
#[derive(Debug)]
pub struct MemoryNavigator {
    history: Mutex<Vec<Route>>,
}

impl MemoryNavigator {
    /// Start at `initial`
    #[must_use]
    pub fn new(initial: Route) -> Self {
        Self {
            history: Mutex::new(vec![initial]),
        }
    }

    /// Every route visited, starting with the initial one
    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// How many times `route` was entered after the initial route
    #[must_use]
    pub fn visits(&self, route: &Route) -> usize {
        self.history().iter().skip(1).filter(|r| *r == route).count()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new(Route::Dashboard)
    }
}

impl Navigator for MemoryNavigator {
    fn current(&self) -> Route {
        self.history
            .lock()
            .ok()
            .and_then(|h| h.last().cloned())
            .unwrap_or(Route::Login)
    }

    fn navigate(&self, route: Route) {
        tracing::debug!(%route, "Navigating");
        if let Ok(mut history) = self.history.lock() {
            history.push(route);
        }
    }

    fn redirect(&self, route: Route) -> bool {
        let Ok(mut history) = self.history.lock() else {
            return false;
        };
        if history.last() == Some(&route) {
            return false;
        }
        tracing::debug!(%route, "Redirecting");
        history.push(route);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_is_a_no_op_when_already_there() {
        let navigator = MemoryNavigator::new(Route::Dashboard);

        assert!(navigator.redirect(Route::Login));
        assert!(!navigator.redirect(Route::Login));

        assert_eq!(navigator.current(), Route::Login);
        assert_eq!(navigator.visits(&Route::Login), 1);
    }

    #[test]
    fn paths_round_trip() {
        for route in [Route::Login, Route::Dashboard, Route::Other("/tasks".to_string())] {
            assert_eq!(Route::from(route.path()), route);
        }
    }
}
