//! Transport port
//!
//! The transport executes one HTTP exchange. Pooling, TLS, DNS and retries
//! all live behind this boundary.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;

use graphlink_domain::{ByteStream, GraphError, GraphResult, HttpMethod};

/// Body of an outgoing request.
pub enum RequestBody {
    /// No body
    Empty,
    /// A fully buffered body
    Buffered(Bytes),
    /// A body produced lazily while the request is sent
    Stream(ByteStream),
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A request handed to the transport.
#[derive(Debug)]
pub struct TransportRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL including the query string
    pub url: String,
    /// Request headers in sending order
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: RequestBody,
}

/// A response returned by the transport.
///
/// The body is not read until [`TransportResponse::bytes`] or
/// [`TransportResponse::text`] is awaited.
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Lazily read response body
    pub body: ByteStream,
}

impl TransportResponse {
    /// Creates a response from a status and a body stream.
    #[must_use]
    pub fn new(status: u16, body: ByteStream) -> Self {
        Self { status, body }
    }

    /// Creates a response with an in-memory body.
    #[must_use]
    pub fn from_bytes(status: u16, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let stream = futures::stream::once(async move { Ok::<_, std::io::Error>(body) });
        Self::new(status, stream.boxed())
    }

    /// Reads the whole body.
    ///
    /// # Errors
    ///
    /// Returns `Network` if the body stream fails midway.
    pub async fn bytes(self) -> GraphResult<Bytes> {
        let status = self.status;
        let mut body = self.body;
        let mut buffer = BytesMut::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| GraphError::Network {
                status: Some(status),
                message: format!("failed to read response body: {e}"),
            })?;
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.freeze())
    }

    /// Reads the whole body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `Network` if the body cannot be read and `Decode` if it is
    /// not valid UTF-8.
    pub async fn text(self) -> GraphResult<String> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| GraphError::Decode(format!("response body is not UTF-8: {e}")))
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Port for executing HTTP exchanges.
///
/// Implementations map their own I/O failures to `GraphError::Network`.
/// Non-success statuses are returned as responses, never as errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and returns the response head with a lazy body.
    ///
    /// # Errors
    ///
    /// Returns `Network` if no response could be obtained.
    async fn send(&self, request: TransportRequest) -> GraphResult<TransportResponse>;
}
