//! Test doubles for the ports.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt, stream};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use graphlink_domain::{ByteStream, GraphError, GraphResult, HttpMethod, RemoteError};

use crate::client::GraphClient;
use crate::config::ClientConfig;
use crate::ports::{
    Decoder, ErrorDetailParser, RequestBody, SecretProof, Transport, TransportRequest,
    TransportResponse,
};

/// A request as seen by [`StubTransport`], body fully read.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

#[derive(Default)]
struct StubState {
    responses: VecDeque<(u16, Bytes)>,
    requests: Vec<RecordedRequest>,
}

/// Transport that replays canned responses and records every request.
#[derive(Clone, Default)]
pub struct StubTransport {
    state: Arc<Mutex<StubState>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response; responses are served in order.
    pub fn respond(self, status: u16, body: impl Into<Bytes>) -> Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back((status, body.into()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn single_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }

    pub fn assert_not_called(&self) {
        assert!(self.requests().is_empty(), "transport must not be invoked");
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: TransportRequest) -> GraphResult<TransportResponse> {
        let body = match request.body {
            RequestBody::Empty => Vec::new(),
            RequestBody::Buffered(bytes) => bytes.to_vec(),
            RequestBody::Stream(stream) => {
                let chunks: Vec<Bytes> = stream
                    .try_collect()
                    .await
                    .map_err(|e| GraphError::network(e.to_string()))?;
                chunks.concat()
            }
        };

        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method: request.method,
            url: request.url,
            headers: request.headers,
            body,
        });
        let (status, body) = state
            .responses
            .pop_front()
            .ok_or_else(|| GraphError::network("no stubbed response left"))?;
        Ok(TransportResponse::from_bytes(status, body))
    }
}

/// Body stream that fails if anyone reads it.
pub struct FailingBody;

impl FailingBody {
    pub fn stream() -> ByteStream {
        stream::once(async { Err(io::Error::other("body must not be read")) }).boxed()
    }
}

/// Decoder backed by `serde_json`.
pub struct SerdeDecoder;

impl Decoder for SerdeDecoder {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> GraphResult<T> {
        serde_json::from_slice(bytes).map_err(|e| GraphError::Decode(e.to_string()))
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> GraphResult<String> {
        serde_json::to_string(value).map_err(|e| GraphError::Decode(e.to_string()))
    }
}

/// Proof that reverses the access token, easy to assert on.
pub struct ReverseProof;

impl SecretProof for ReverseProof {
    fn prove(&self, access_token: &str, _app_secret: &str) -> GraphResult<String> {
        Ok(access_token.chars().rev().collect())
    }
}

/// Minimal parser for `{"error": {...}}` documents.
pub struct StubErrorParser;

impl ErrorDetailParser for StubErrorParser {
    fn parse(&self, body: &str, status: u16) -> Option<GraphError> {
        let document: Value = serde_json::from_str(body).ok()?;
        let error = document.get("error")?;
        let mut remote = RemoteError::new(status, error.get("message")?.as_str()?);
        if let Some(code) = error.get("code").and_then(Value::as_i64) {
            remote = remote.with_code(code);
        }
        if let Some(subcode) = error.get("error_subcode").and_then(Value::as_i64) {
            remote = remote.with_subcode(subcode);
        }
        match error.get("type").and_then(Value::as_str) {
            Some("OAuthException") => Some(GraphError::OAuth(remote.with_type("OAuthException"))),
            _ => Some(GraphError::Api(remote)),
        }
    }
}

/// Builds a client over a stub transport with the test collaborators.
pub fn client_with(transport: &StubTransport, config: ClientConfig) -> GraphClient<SerdeDecoder> {
    GraphClient::new(
        config,
        Arc::new(transport.clone()),
        SerdeDecoder,
        Arc::new(ReverseProof),
        Arc::new(StubErrorParser),
    )
}
