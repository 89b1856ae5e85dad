//! Client error taxonomy.
//!
//! DESIGN
//! ======
//! Four categories matter to callers: input rejected before any request
//! (`Validation`), credentials or token rejected by the gateway
//! (`Authentication`), navigation refused by the gate (`Redirected`), and
//! the gateway being unreachable (`Network`). The remaining variants cover
//! gateway responses that fit none of those and local storage failures.

use crate::router::Route;

/// Client-side input rejected before a request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("invalid role `{0}` (expected `user` or `admin`)")]
    InvalidRole(String),
    #[error("invalid {field} `{value}` (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
    #[error("end date must be after start date")]
    EndBeforeStart,
    #[error("only numeric values allowed for price")]
    PriceNotNumeric,
    #[error("price must be at least {min} per day")]
    PriceTooLow { min: u32 },
    #[error("session token must not be empty")]
    EmptyToken,
}

/// Errors produced by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The gateway rejected the supplied credentials or the session token.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The gate refused a navigation; the caller lands on `to` instead.
    #[error("redirected from {from} to {to}")]
    Redirected { from: String, to: Route },

    /// The gateway could not be reached or timed out.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The gateway returned a non-success status other than 401.
    #[error("gateway returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// A success response body did not match the expected shape.
    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),

    /// The current role may view the page but not submit its action.
    #[error("{0}")]
    ActionUnavailable(&'static str),

    /// Reading or writing the persisted session failed.
    #[error("session storage failed: {0}")]
    Storage(#[from] std::io::Error),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ClientError {
    /// Whether this error should be shown to the user as a failure.
    ///
    /// Redirects are the gate's normal outcome and are not failures.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Redirected { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return Self::InvalidResponse(error.to_string());
        }
        Self::Network(error)
    }
}
