//! Domain error types

use std::fmt;

use thiserror::Error;

/// Details of a structured error returned by the remote API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteError {
    /// HTTP status of the failed response.
    pub http_status: u16,
    /// Remote error code (`code` / legacy `error_code`).
    pub code: Option<i64>,
    /// Remote error subcode.
    pub subcode: Option<i64>,
    /// Remote error message.
    pub message: String,
    /// Remote error type, e.g. `OAuthException`.
    pub error_type: Option<String>,
    /// Title suitable for showing to an end user.
    pub user_title: Option<String>,
    /// Message suitable for showing to an end user.
    pub user_message: Option<String>,
    /// Whether the remote side flagged the failure as transient.
    pub is_transient: bool,
    /// Remote trace identifier for support requests.
    pub trace_id: Option<String>,
}

impl RemoteError {
    /// Creates a remote error with a status and message.
    #[must_use]
    pub fn new(http_status: u16, message: impl Into<String>) -> Self {
        Self {
            http_status,
            message: message.into(),
            ..Self::default()
        }
    }

    /// Sets the remote error code.
    #[must_use]
    pub const fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    /// Sets the remote error subcode.
    #[must_use]
    pub const fn with_subcode(mut self, subcode: i64) -> Self {
        self.subcode = Some(subcode);
        self
    }

    /// Sets the remote error type.
    #[must_use]
    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {}", self.message, self.http_status)?;
        if let Some(code) = self.code {
            write!(f, ", code {code}")?;
        }
        if let Some(subcode) = self.subcode {
            write!(f, ", subcode {subcode}")?;
        }
        f.write_str(")")
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

/// Errors produced by the graph client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The caller passed an argument the API call cannot accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation needs client state that was not configured.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// Authorization or token problem reported by the remote API.
    #[error("OAuth error: {0}")]
    OAuth(RemoteError),

    /// The access token lacks a permission the call requires.
    #[error("permission error: {0}")]
    Permission(RemoteError),

    /// The caller hit a remote rate limit.
    #[error("rate limit error: {0}")]
    RateLimit(RemoteError),

    /// Any other structured error reported by the remote API.
    #[error("API error: {0}")]
    Api(RemoteError),

    /// Non-success response without a structured error, or transport failure.
    #[error("network error{}: {message}", status_suffix(.status))]
    Network {
        /// HTTP status, absent when no response was received.
        status: Option<u16>,
        /// Description of the failure.
        message: String,
    },

    /// The user has not finished device authorization yet; poll again later.
    #[error("device authorization pending: {0}")]
    DeviceTokenPending(RemoteError),

    /// The device flow is being polled too often; poll again after a longer delay.
    #[error("device authorization polled too frequently: {0}")]
    DeviceTokenSlowDown(RemoteError),

    /// The device code expired before the user authorized it.
    #[error("device code expired: {0}")]
    DeviceTokenExpired(RemoteError),

    /// A response body could not be decoded into the expected type.
    #[error("decode error: {0}")]
    Decode(String),
}

impl GraphError {
    /// Creates an `InvalidArgument` error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates an `IllegalState` error.
    #[must_use]
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState(message.into())
    }

    /// Creates a `Network` error carrying a response status.
    #[must_use]
    pub fn network_status(status: u16) -> Self {
        Self::Network {
            status: Some(status),
            message: format!("request failed with HTTP status {status}"),
        }
    }

    /// Creates a `Network` error for a failure with no response.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            status: None,
            message: message.into(),
        }
    }

    /// Structured remote details, if the error carries any.
    #[must_use]
    pub const fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::OAuth(remote)
            | Self::Permission(remote)
            | Self::RateLimit(remote)
            | Self::Api(remote)
            | Self::DeviceTokenPending(remote)
            | Self::DeviceTokenSlowDown(remote)
            | Self::DeviceTokenExpired(remote) => Some(remote),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            _ => self.remote().map(|remote| remote.http_status),
        }
    }

    /// Remote error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        self.remote().and_then(|remote| remote.code)
    }

    /// True when a device-flow poll should be repeated after a delay.
    #[must_use]
    pub const fn is_device_poll_retryable(&self) -> bool {
        matches!(
            self,
            Self::DeviceTokenPending(_) | Self::DeviceTokenSlowDown(_)
        )
    }

    /// True when the remote API flagged the failure as transient, or on rate limiting.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimit(_)) || self.remote().is_some_and(|r| r.is_transient)
    }
}

/// Result type alias for graph client operations.
pub type GraphResult<T> = Result<T, GraphError>;
