//! Transport implementation using reqwest.
//!
//! This adapter implements the `Transport` port. Request bodies are streamed
//! into reqwest and response bodies are handed back unread.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Body, Client, Method, Url};
use tracing::trace;

use graphlink_application::ports::{RequestBody, Transport, TransportRequest, TransportResponse};
use graphlink_domain::{GraphError, GraphResult, HttpMethod};

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("Graphlink/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of redirects followed.
const MAX_REDIRECTS: usize = 10;

/// Transport implementation using reqwest.
///
/// Wraps a `reqwest::Client`, which pools connections internally; clone the
/// transport or share it behind an `Arc` rather than building new ones.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with default settings.
    ///
    /// Default configuration:
    /// - Request timeout: 30 seconds
    /// - Follow redirects: up to 10
    /// - User-Agent: "Graphlink/<version>"
    ///
    /// # Errors
    ///
    /// Returns `Network` if the client cannot be created.
    pub fn new() -> GraphResult<Self> {
        Self::with_settings(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)
    }

    /// Creates a transport with a custom user agent and timeout.
    ///
    /// # Errors
    ///
    /// Returns `Network` if the client cannot be created.
    pub fn with_settings(user_agent: &str, timeout: Duration) -> GraphResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| GraphError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Creates a transport over an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Maps reqwest errors to `GraphError::Network`.
    ///
    /// The request URL carries credentials in its query, so it is dropped
    /// from the message; only the host is kept.
    fn map_error(error: reqwest::Error) -> GraphError {
        let host = error
            .url()
            .and_then(|u| u.host_str())
            .unwrap_or("unknown")
            .to_string();
        let status = error.status().map(|s| s.as_u16());
        let error = error.without_url();

        let message = if error.is_timeout() {
            format!("request to {host} timed out")
        } else if error.is_connect() {
            format!("connection to {host} failed: {error}")
        } else if error.is_redirect() {
            format!("too many redirects (max {MAX_REDIRECTS}) from {host}")
        } else {
            error.to_string()
        };

        GraphError::Network { status, message }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> GraphResult<TransportResponse> {
        let url = Url::parse(&request.url)
            .map_err(|e| GraphError::invalid_argument(format!("invalid URL: {e}")))?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Buffered(bytes) => builder.body(bytes),
            RequestBody::Stream(stream) => builder.body(Body::wrap_stream(stream)),
        };

        let response = builder.send().await.map_err(Self::map_error)?;
        let status = response.status().as_u16();
        trace!(status, "response head received");

        let body = response
            .bytes_stream()
            .map_err(|e| io::Error::other(e.without_url()))
            .boxed();
        Ok(TransportResponse::new(status, body))
    }
}
