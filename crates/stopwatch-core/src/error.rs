//! Shared error type across stopwatch crates.

use thiserror::Error;

/// Stable error codes (surfaced in logs and HTTP error bodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid configuration.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Host clock unusable.
    ClockUnavailable,
    /// Upstream response body failed while it was being read.
    UpstreamBody,
    /// Internal error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadConfig => "BAD_CONFIG",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::ClockUnavailable => "CLOCK_UNAVAILABLE",
            ClientCode::UpstreamBody => "UPSTREAM_BODY",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, StopwatchError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum StopwatchError {
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("clock unavailable: {0}")]
    Clock(String),
    #[error("upstream body: {0}")]
    UpstreamBody(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl StopwatchError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            StopwatchError::BadConfig(_) => ClientCode::BadConfig,
            StopwatchError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            StopwatchError::Clock(_) => ClientCode::ClockUnavailable,
            StopwatchError::UpstreamBody(_) => ClientCode::UpstreamBody,
            StopwatchError::Internal(_) => ClientCode::Internal,
        }
    }
}
