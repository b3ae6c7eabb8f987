//! API version selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GraphError;

/// Version of the remote API a client talks to.
///
/// A versioned client prefixes every path with `vMAJOR.MINOR`; an
/// unversioned one sends paths as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// No version segment in request paths
    #[default]
    Unversioned,
    /// A specific `vMAJOR.MINOR` version
    Version {
        /// Major version number
        major: u16,
        /// Minor version number
        minor: u16,
    },
}

impl ApiVersion {
    /// Creates a versioned `vMAJOR.MINOR`.
    #[must_use]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self::Version { major, minor }
    }

    /// Returns true if request paths carry a version segment.
    #[must_use]
    pub const fn is_versioned(&self) -> bool {
        matches!(self, Self::Version { .. })
    }

    /// The path segment for this version, e.g. `v19.0`, or `None` when unversioned.
    #[must_use]
    pub fn url_element(&self) -> Option<String> {
        match self {
            Self::Unversioned => None,
            Self::Version { major, minor } => Some(format!("v{major}.{minor}")),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.url_element() {
            Some(element) => f.write_str(&element),
            None => f.write_str("unversioned"),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = GraphError;

    /// Accepts `v19.0`, `19.0`, or an empty / `unversioned` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unversioned") {
            return Ok(Self::Unversioned);
        }

        let invalid = || GraphError::invalid_argument(format!("invalid API version: {s}"));
        let digits = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let (major, minor) = digits.split_once('.').ok_or_else(invalid)?;
        let major = major.parse::<u16>().map_err(|_| invalid())?;
        let minor = minor.parse::<u16>().map_err(|_| invalid())?;

        Ok(Self::new(major, minor))
    }
}

impl Serialize for ApiVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_versions() {
        assert_eq!("v19.0".parse::<ApiVersion>().unwrap(), ApiVersion::new(19, 0));
        assert_eq!("2.12".parse::<ApiVersion>().unwrap(), ApiVersion::new(2, 12));
        assert_eq!("".parse::<ApiVersion>().unwrap(), ApiVersion::Unversioned);
        assert_eq!(
            "Unversioned".parse::<ApiVersion>().unwrap(),
            ApiVersion::Unversioned
        );
    }

    #[test]
    fn test_reject_malformed_versions() {
        for raw in ["v19", "latest", "v.1", "v1.x", "v-1.0"] {
            assert!(
                matches!(raw.parse::<ApiVersion>(), Err(GraphError::InvalidArgument(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_url_element() {
        assert_eq!(ApiVersion::new(19, 0).url_element().as_deref(), Some("v19.0"));
        assert_eq!(ApiVersion::Unversioned.url_element(), None);
        assert!(!ApiVersion::default().is_versioned());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ApiVersion::new(3, 1)).unwrap();
        assert_eq!(json, "\"v3.1\"");
        let parsed: ApiVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ApiVersion::new(3, 1));
    }
}
