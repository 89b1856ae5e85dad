//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::session::FileBackend;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Gateway root, without a trailing slash.
    pub base_url: String,
    pub session_file: PathBuf,
    pub timeouts: Timeouts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            session_file: FileBackend::default_path(),
            timeouts: Timeouts::default(),
        }
    }
}

impl Config {
    /// Build config from process environment variables.
    ///
    /// Optional:
    /// - `CARBOOK_BASE_URL`: default `http://localhost:5000/api`
    /// - `CARBOOK_SESSION_FILE`: default `<config dir>/carbook/session.json`
    /// - `CARBOOK_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CARBOOK_CONNECT_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let base_url = lookup("CARBOOK_BASE_URL")
            .filter(|value| !value.trim().is_empty())
            .map_or(defaults.base_url, |value| normalize_base_url(&value));
        let session_file = lookup("CARBOOK_SESSION_FILE")
            .filter(|value| !value.trim().is_empty())
            .map_or(defaults.session_file, PathBuf::from);
        let timeouts = Timeouts {
            request_secs: parse_u64(
                lookup("CARBOOK_REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            connect_secs: parse_u64(
                lookup("CARBOOK_CONNECT_TIMEOUT_SECS"),
                DEFAULT_CONNECT_TIMEOUT_SECS,
            ),
        };

        Self {
            base_url,
            session_file,
            timeouts,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
