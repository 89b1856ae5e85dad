//! # carbook
//!
//! Client for a car-rental booking service: login and registration, the car
//! catalog, bookings, and admin management of car listings.
//!
//! The interesting part is the session state machine. `session` owns the
//! persisted credential, `gate` decides what a credential may see, `router`
//! applies those decisions to paths, and `api` talks to the gateway with the
//! credential attached. `app` wires them together for the CLI.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod forms;
pub mod gate;
pub mod router;
pub mod session;

#[cfg(test)]
mod test_support;

pub use app::App;
pub use config::Config;
pub use error::{ClientError, ValidationError};
pub use gate::{AuthorizationDecision, RequiredRole, authorize};
pub use router::{AuthState, Navigation, Route, Router};
pub use session::{Role, Session, SessionStore};
