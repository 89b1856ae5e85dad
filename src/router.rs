//! Path routing and the authentication state machine.
//!
//! DESIGN
//! ======
//! Every navigation reads the current session from the shared store and asks
//! `gate::authorize` for a fresh decision. A navigation always lands on a
//! real view: denied targets, unknown paths, and the login page for an
//! already-authenticated identity all redirect.

use std::fmt;
use std::sync::Arc;

use crate::gate::{self, RequiredRole};
use crate::session::{Role, Session, SessionStore};

/// Views the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`: registration form.
    Register,
    /// `/login`
    Login,
    /// `/cars`: public catalog.
    Cars,
    /// `/dashboard`: admin car management.
    Dashboard,
    /// `/book`: booking form.
    Book,
}

impl Route {
    pub const ALL: [Self; 5] = [Self::Register, Self::Login, Self::Cars, Self::Dashboard, Self::Book];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Register => "/",
            Self::Login => "/login",
            Self::Cars => "/cars",
            Self::Dashboard => "/dashboard",
            Self::Book => "/book",
        }
    }

    /// Match a URL path, ignoring any query string and trailing slash.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Self::ALL.into_iter().find(|route| route.path() == normalized)
    }

    #[must_use]
    pub fn required_role(self) -> RequiredRole {
        match self {
            Self::Register | Self::Login | Self::Cars => RequiredRole::None,
            Self::Book => RequiredRole::User,
            Self::Dashboard => RequiredRole::Admin,
        }
    }

    /// Views that only make sense without a session.
    #[must_use]
    pub fn guest_only(self) -> bool {
        matches!(self, Self::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Which identity, if any, the client currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    AuthenticatedUser,
    AuthenticatedAdmin,
}

impl AuthState {
    #[must_use]
    pub fn from_session(session: Option<&Session>) -> Self {
        match session.map(Session::role) {
            None => Self::Anonymous,
            Some(Role::User) => Self::AuthenticatedUser,
            Some(Role::Admin) => Self::AuthenticatedAdmin,
        }
    }

    /// Where this state lands after login or a redirect with no better target.
    #[must_use]
    pub fn home(self) -> Route {
        match self {
            Self::Anonymous => Route::Login,
            Self::AuthenticatedUser => Route::Cars,
            Self::AuthenticatedAdmin => Route::Dashboard,
        }
    }
}

/// Result of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    pub landed: Route,
    pub redirected: bool,
}

/// Maps paths to views through the auth gate.
#[derive(Debug, Clone)]
pub struct Router {
    store: Arc<SessionStore>,
}

impl Router {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        AuthState::from_session(self.store.current().as_ref())
    }

    /// Resolve `path` against the current session.
    #[must_use]
    pub fn navigate(&self, path: &str) -> Navigation {
        let session = self.store.current();
        let state = AuthState::from_session(session.as_ref());

        let landed = match Route::from_path(path) {
            None => state.home(),
            Some(route) => {
                let decision = gate::authorize(session.as_ref(), route.required_role());
                match decision.redirect_to {
                    Some(target) if !decision.allowed => target,
                    _ if route.guest_only() && state != AuthState::Anonymous => state.home(),
                    _ => route,
                }
            }
        };

        let redirected = Route::from_path(path) != Some(landed);
        if redirected {
            tracing::debug!(requested = path, landed = %landed, ?state, "navigation redirected");
        }

        Navigation {
            requested: path.to_owned(),
            landed,
            redirected,
        }
    }

    #[must_use]
    pub fn navigate_to(&self, route: Route) -> Navigation {
        self.navigate(route.path())
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
