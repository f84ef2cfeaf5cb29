//! Client-side navigation between screens

use std::fmt;
use tokio::sync::watch;
use tracing::info;

use crate::error::ApiResult;
use crate::session::SessionStore;

/// Screens of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Profile,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Profile => "/profile",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the current route; cloning shares the same route
#[derive(Clone)]
pub struct Navigator {
    sender: watch::Sender<Route>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Current route
    pub fn current(&self) -> Route {
        *self.sender.borrow()
    }

    /// Navigate to `route`
    pub fn redirect(&self, route: Route) {
        info!("Navigating to {}", route);
        self.sender.send_replace(route);
    }

    /// Receiver notified on every navigation
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.sender.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Login)
    }
}

/// Route guard for protected screens: redirects to the login screen and
/// returns `false` when there is no authenticated session
pub fn require_session(session: &SessionStore, navigator: &Navigator) -> ApiResult<bool> {
    if session.is_authenticated()? {
        return Ok(true);
    }

    navigator.redirect(Route::Login);
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_redirect_updates_subscribers() {
        let navigator = Navigator::new(Route::Dashboard);
        let mut receiver = navigator.subscribe();

        navigator.redirect(Route::Login);

        assert_eq!(navigator.current(), Route::Login);
        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), Route::Login);
    }

    #[test]
    fn test_require_session() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        let navigator = Navigator::new(Route::Profile);

        assert!(!require_session(&session, &navigator).unwrap());
        assert_eq!(navigator.current(), Route::Login);

        session.set_token("abc").unwrap();
        navigator.redirect(Route::Profile);
        assert!(require_session(&session, &navigator).unwrap());
        assert_eq!(navigator.current(), Route::Profile);
    }
}
