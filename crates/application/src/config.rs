//! Client configuration
//!
//! A plain record read once when the client is built. Every field has a
//! usable default; [`ClientConfig::validate`] normalizes secrets and checks
//! the endpoint URLs.

use graphlink_domain::{ApiVersion, GraphError, GraphResult};
use url::Url;

use crate::tokens::DeviceErrorMapping;

/// Environment variable holding the API version.
pub const ENV_API_VERSION: &str = "GRAPHLINK_API_VERSION";
/// Environment variable holding the access token.
pub const ENV_ACCESS_TOKEN: &str = "GRAPHLINK_ACCESS_TOKEN";
/// Environment variable holding the app secret.
pub const ENV_APP_SECRET: &str = "GRAPHLINK_APP_SECRET";
/// Environment variable overriding the graph base URL.
pub const ENV_GRAPH_URL: &str = "GRAPHLINK_GRAPH_URL";
/// Environment variable overriding the video upload base URL.
pub const ENV_GRAPH_VIDEO_URL: &str = "GRAPHLINK_GRAPH_VIDEO_URL";

/// Default base URL for API calls.
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";
/// Default base URL for video uploads.
pub const DEFAULT_GRAPH_VIDEO_URL: &str = "https://graph-video.facebook.com";

/// Base URLs the client sends requests to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Base URL for every call except video uploads
    pub graph: String,
    /// Base URL for video uploads
    pub graph_video: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            graph: DEFAULT_GRAPH_URL.to_string(),
            graph_video: DEFAULT_GRAPH_VIDEO_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Uses one base URL for all calls, video uploads included.
    #[must_use]
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            graph_video: base.clone(),
            graph: base,
        }
    }
}

/// Configuration of a graph client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// API version prefixed to request paths
    pub api_version: ApiVersion,
    /// Access token sent with every call
    pub access_token: Option<String>,
    /// App secret used to compute `appsecret_proof`
    pub app_secret: Option<String>,
    /// Base URLs
    pub endpoints: Endpoints,
    /// How device-flow error subcodes are interpreted
    pub device_errors: DeviceErrorMapping,
}

impl ClientConfig {
    /// Creates a configuration for the given API version with defaults elsewhere.
    #[must_use]
    pub fn new(api_version: ApiVersion) -> Self {
        Self {
            api_version,
            ..Self::default()
        }
    }

    /// Sets the access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the app secret.
    #[must_use]
    pub fn with_app_secret(mut self, secret: impl Into<String>) -> Self {
        self.app_secret = Some(secret.into());
        self
    }

    /// Sets the base URLs.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Sets the device error mapping.
    #[must_use]
    pub fn with_device_errors(mut self, mapping: DeviceErrorMapping) -> Self {
        self.device_errors = mapping;
        self
    }

    /// Reads the configuration from `GRAPHLINK_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a malformed version or endpoint URL.
    pub fn from_env() -> GraphResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a malformed version or endpoint URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> GraphResult<Self> {
        let api_version = lookup(ENV_API_VERSION)
            .map(|raw| raw.parse::<ApiVersion>())
            .transpose()?
            .unwrap_or_default();

        let mut endpoints = Endpoints::default();
        if let Some(graph) = lookup(ENV_GRAPH_URL) {
            endpoints.graph = graph;
        }
        if let Some(video) = lookup(ENV_GRAPH_VIDEO_URL) {
            endpoints.graph_video = video;
        }

        Self {
            api_version,
            access_token: lookup(ENV_ACCESS_TOKEN),
            app_secret: lookup(ENV_APP_SECRET),
            endpoints,
            device_errors: DeviceErrorMapping::default(),
        }
        .validate()
    }

    /// Normalizes and checks the configuration.
    ///
    /// Blank secrets become `None`, endpoint URLs lose trailing slashes and
    /// must be absolute `http`/`https` URLs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unusable endpoint URL.
    pub fn validate(mut self) -> GraphResult<Self> {
        self.access_token = trim_to_none(self.access_token);
        self.app_secret = trim_to_none(self.app_secret);
        self.endpoints.graph = check_base_url("graph", &self.endpoints.graph)?;
        self.endpoints.graph_video = check_base_url("graph_video", &self.endpoints.graph_video)?;
        Ok(self)
    }

    /// Returns the secret-proof inputs when both are configured.
    #[must_use]
    pub fn proof_credentials(&self) -> Option<(&str, &str)> {
        self.access_token.as_deref().zip(self.app_secret.as_deref())
    }
}

fn trim_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_base_url(name: &str, raw: &str) -> GraphResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed)
        .map_err(|e| GraphError::invalid_argument(format!("invalid {name} URL '{raw}': {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(GraphError::invalid_argument(format!(
            "{name} URL must be an absolute http(s) URL: {raw}"
        )));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_validate_trims_blank_secrets() {
        let config = ClientConfig::default()
            .with_access_token("   ")
            .with_app_secret(" s3cret ")
            .validate()
            .unwrap();
        assert_eq!(config.access_token, None);
        assert_eq!(config.app_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.proof_credentials(), None);
    }

    #[test]
    fn test_validate_strips_trailing_slash() {
        let config = ClientConfig::default()
            .with_endpoints(Endpoints::single("http://127.0.0.1:8080/"))
            .validate()
            .unwrap();
        assert_eq!(config.endpoints.graph, "http://127.0.0.1:8080");
        assert_eq!(config.endpoints.graph_video, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        for bad in ["graph.example.com", "ftp://graph.example.com", ""] {
            let result = ClientConfig::default()
                .with_endpoints(Endpoints::single(bad))
                .validate();
            assert!(
                matches!(result, Err(GraphError::InvalidArgument(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_VERSION, "v19.0"),
            (ENV_ACCESS_TOKEN, "token"),
            (ENV_GRAPH_URL, "https://graph.example.com"),
        ]
        .into_iter()
        .collect();

        let config =
            ClientConfig::from_lookup(|key| vars.get(key).map(ToString::to_string)).unwrap();
        assert_eq!(config.api_version, ApiVersion::new(19, 0));
        assert_eq!(config.access_token.as_deref(), Some("token"));
        assert_eq!(config.app_secret, None);
        assert_eq!(config.endpoints.graph, "https://graph.example.com");
        assert_eq!(config.endpoints.graph_video, DEFAULT_GRAPH_VIDEO_URL);
    }

    #[test]
    fn test_from_lookup_rejects_bad_version() {
        let result = ClientConfig::from_lookup(|key| {
            (key == ENV_API_VERSION).then(|| "latest".to_string())
        });
        assert!(matches!(result, Err(GraphError::InvalidArgument(_))));
    }
}
