//! Permission decisions for navigation.
//!
//! `authorize` is the only place role checks happen. It does no I/O and has
//! no failure path, so every combination of inputs yields a decision.

use crate::router::Route;
use crate::session::{Role, Session};

/// Identity a view requires before it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredRole {
    /// Public view.
    None,
    /// Any authenticated identity, whatever its role.
    User,
    /// Authenticated identity with the admin role.
    Admin,
}

/// Outcome of one navigation attempt. Computed per navigation, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationDecision {
    pub allowed: bool,
    pub redirect_to: Option<Route>,
}

impl AuthorizationDecision {
    const ALLOW: Self = Self {
        allowed: true,
        redirect_to: None,
    };

    const fn deny(redirect_to: Route) -> Self {
        Self {
            allowed: false,
            redirect_to: Some(redirect_to),
        }
    }
}

/// Decide whether `session` may see a view requiring `required`.
#[must_use]
pub fn authorize(session: Option<&Session>, required: RequiredRole) -> AuthorizationDecision {
    if required == RequiredRole::None {
        return AuthorizationDecision::ALLOW;
    }

    let Some(session) = session else {
        return AuthorizationDecision::deny(Route::Login);
    };

    match required {
        RequiredRole::Admin if session.role() != Role::Admin => {
            AuthorizationDecision::deny(Route::Login)
        }
        // Admins pass user-level checks; the booking view disables its
        // submit action for them instead.
        _ => AuthorizationDecision::ALLOW,
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
