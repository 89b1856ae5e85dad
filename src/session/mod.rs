//! Session persistence.
//!
//! ARCHITECTURE
//! ============
//! `SessionStore` is the only owner of the current `Session`. It keeps an
//! in-memory copy that is authoritative for the running process and mirrors
//! every change to a `SessionBackend` before returning, so a restart right
//! after `save` or `clear` observes the new state.
//!
//! The store is an ordinary value. Callers share it as `Arc<SessionStore>`;
//! there is no global.
//!
//! LIMITATIONS
//! ===========
//! Another process clearing the same backend is only observed on the next
//! `load()`.

mod backend;

use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ValidationError};

pub use backend::{FileBackend, MemoryBackend, SessionBackend};

/// Role attached to an authenticated identity by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(ValidationError::InvalidRole(other.to_owned())),
        }
    }
}

/// An authenticated identity: bearer token plus role.
///
/// Both fields are always populated; a token-only or role-only session
/// cannot be constructed or deserialized.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedSession")]
pub struct Session {
    token: String,
    role: Role,
}

#[derive(Deserialize)]
struct PersistedSession {
    token: String,
    role: Role,
}

impl TryFrom<PersistedSession> for Session {
    type Error = ValidationError;

    fn try_from(raw: PersistedSession) -> Result<Self, Self::Error> {
        Self::new(raw.token, raw.role)
    }
}

impl Session {
    /// Build a session, rejecting a blank token.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyToken`] if `token` is empty or whitespace.
    pub fn new(token: impl Into<String>, role: Role) -> Result<Self, ValidationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ValidationError::EmptyToken);
        }
        Ok(Self { token, role })
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Owner of the current session and its persisted copy.
pub struct SessionStore {
    backend: Box<dyn SessionBackend>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Open a store over `backend`, loading any previously persisted session.
    pub fn open(backend: impl SessionBackend + 'static) -> Self {
        let store = Self {
            backend: Box::new(backend),
            current: RwLock::new(None),
        };
        store.load();
        store
    }

    /// Store with nothing persisted beyond the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(MemoryBackend::default())
    }

    /// Re-read the persisted session and make it current.
    ///
    /// Unreadable or malformed data is discarded and reported as absent.
    pub fn load(&self) -> Option<Session> {
        let loaded = match self.backend.read() {
            Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(error) => {
                    tracing::warn!(%error, "discarding malformed persisted session");
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(%error, "persisted session unreadable; treating as absent");
                None
            }
        };
        self.set_current(loaded.clone());
        loaded
    }

    /// Persist `session` and make it current.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the backend write fails. The
    /// in-memory session is left unchanged in that case.
    pub fn save(&self, session: Session) -> Result<(), ClientError> {
        let encoded = serde_json::to_string(&session)
            .map_err(|error| ClientError::Storage(std::io::Error::other(error)))?;
        let mut guard = self.write_guard();
        self.backend.write(&encoded)?;
        tracing::debug!(role = %session.role(), "session saved");
        *guard = Some(session);
        Ok(())
    }

    /// Remove the session. Clearing an absent session is a no-op.
    ///
    /// The in-memory session is dropped even if the persisted copy cannot
    /// be removed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the backend cannot remove the
    /// persisted copy.
    pub fn clear(&self) -> Result<(), ClientError> {
        let mut guard = self.write_guard();
        self.clear_locked(&mut guard)
    }

    /// Clear the session only if it still carries `token`.
    ///
    /// Returns whether a session was cleared. A session saved after the
    /// request that carried `token` was sent is left alone.
    ///
    /// # Errors
    ///
    /// Same as [`SessionStore::clear`]; the in-memory session is already
    /// dropped when this returns an error.
    pub fn clear_if_token(&self, token: &str) -> Result<bool, ClientError> {
        let mut guard = self.write_guard();
        if guard.as_ref().map(Session::token) != Some(token) {
            return Ok(false);
        }
        self.clear_locked(&mut guard)?;
        Ok(true)
    }

    fn clear_locked(&self, current: &mut Option<Session>) -> Result<(), ClientError> {
        if current.take().is_some() {
            tracing::debug!("session cleared");
        }
        self.backend.remove()?;
        Ok(())
    }

    /// In-memory session for this process.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Bearer token of the current session, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.current().map(|session| session.token)
    }

    fn set_current(&self, session: Option<Session>) {
        *self.write_guard() = session;
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
