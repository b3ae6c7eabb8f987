//! Token and device-authorization types

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// An access token returned by one of the token-exchange operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// The access token string
    pub access_token: String,
    /// Token type (usually "bearer"), when reported
    #[serde(default)]
    pub token_type: Option<String>,
    /// When the token expires, if known
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Creates a token that expires `expires_in_secs` seconds from now.
    ///
    /// A lifetime too large to represent leaves the expiry unknown.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        token_type: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        let expires_at = expires_in_secs.and_then(|secs| {
            TimeDelta::try_seconds(secs).and_then(|delta| Utc::now().checked_add_signed(delta))
        });

        Self {
            access_token: access_token.into(),
            token_type,
            expires_at,
        }
    }

    /// Parses a query-string encoded token such as
    /// `access_token=abc&expires=5183944`.
    ///
    /// Both `expires` and `expires_in` are accepted for the lifetime.
    ///
    /// # Errors
    ///
    /// Returns `Decode` if the string has no `access_token` pair.
    pub fn from_query_string(query: &str) -> GraphResult<Self> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query.trim())
            .map_err(|e| GraphError::Decode(format!("malformed token query string: {e}")))?;

        let mut access_token = None;
        let mut token_type = None;
        let mut expires_in = None;
        for (key, value) in pairs {
            match key.as_str() {
                "access_token" => access_token = Some(value),
                "token_type" => token_type = Some(value),
                "expires" | "expires_in" => expires_in = value.parse::<i64>().ok(),
                _ => {}
            }
        }

        let access_token = access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GraphError::Decode("response contains no access token".to_string()))?;

        Ok(Self::new(access_token, token_type, expires_in))
    }

    /// Returns true if the token has a known expiry in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| Utc::now() >= expires_at)
    }

    /// Time until expiry in seconds, or None if no expiry.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|exp| (exp - Utc::now()).num_seconds())
    }
}

/// A device code issued at the start of the device-authorization flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCode {
    /// Opaque code used when polling for the token
    pub code: String,
    /// Code the end user types on the verification page
    pub user_code: String,
    /// Page where the end user enters the user code
    pub verification_uri: String,
    /// Seconds until the code expires
    pub expires_in: u64,
    /// Minimum seconds between polls
    pub interval: u64,
}

impl DeviceCode {
    /// Minimum delay between two polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Lifetime of the code.
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }
}

/// Introspection result for an access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugTokenInfo {
    /// App the token belongs to
    #[serde(default)]
    pub app_id: Option<String>,
    /// Name of the app
    #[serde(default)]
    pub application: Option<String>,
    /// Token kind, e.g. `USER` or `PAGE`
    #[serde(default, rename = "type")]
    pub token_type: Option<String>,
    /// User the token was issued to
    #[serde(default)]
    pub user_id: Option<String>,
    /// Whether the token is currently valid
    #[serde(default)]
    pub is_valid: bool,
    /// When the token was issued
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub issued_at: Option<DateTime<Utc>>,
    /// When the token expires (epoch 0 means never)
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
    /// When data access granted with the token expires
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub data_access_expires_at: Option<DateTime<Utc>>,
    /// Permissions granted to the token
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl DebugTokenInfo {
    /// Returns true if the token never expires.
    #[must_use]
    pub fn never_expires(&self) -> bool {
        self.expires_at.is_some_and(|at| at.timestamp() == 0)
    }
}

/// An ordered set of permissions requested during authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    permissions: Vec<String>,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            permissions: Vec::new(),
        }
    }

    /// Adds a permission; duplicates are ignored.
    #[must_use]
    pub fn with(mut self, permission: impl Into<String>) -> Self {
        let permission = permission.into();
        if !permission.trim().is_empty() && !self.permissions.contains(&permission) {
            self.permissions.push(permission);
        }
        self
    }

    /// Returns the permissions in insertion order.
    #[must_use]
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.permissions.join(","))
    }
}

impl<S: Into<String>> FromIterator<S> for Scope {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::with)
    }
}
