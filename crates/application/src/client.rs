//! Graph client: request orchestration
//!
//! Every operation follows the same shape: synchronous preparation
//! (parameter checks, URL resolution, body framing), one transport call,
//! classification, then decoding. Preparation finishes before the first
//! `.await`, so caller mistakes surface without touching the network.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use graphlink_domain::{
    Attachment, BatchRequest, BatchResponse, GraphError, GraphResult, HttpMethod, Page, Parameter,
};

use crate::classifier::Classified;
use crate::codec::{self, ACCESS_TOKEN_PARAM, APPSECRET_PROOF_PARAM, IDS_PARAM};
use crate::config::ClientConfig;
use crate::endpoint::EndpointResolver;
use crate::multipart;
use crate::pagination::{self, Direction};
use crate::ports::{
    Decoder, ErrorDetailParser, RequestBody, SecretProof, Transport, TransportRequest,
    TransportResponse,
};
use crate::query::{set_query_param, strip_query_params};

/// Content type of form-encoded `POST` bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const BATCH_PARAM: &str = "batch";
const DELETE_SUCCESS_TEXT: &str = "Successfully deleted";
const SECRET_PARAMS: &[&str] = &[ACCESS_TOKEN_PARAM, APPSECRET_PROOF_PARAM];

/// A fully prepared request: method, signed URL, headers and body.
pub type PreparedCall = TransportRequest;

/// Removes credentials from a URL before it is logged or exposed.
#[must_use]
pub fn redact_url(url: &str) -> String {
    strip_query_params(url, SECRET_PARAMS)
}

/// Asynchronous client for a versioned graph-style API.
///
/// The client is cheap to share: wrap it in an `Arc` and call it from any
/// number of tasks. Configuration is fixed at construction.
pub struct GraphClient<D: Decoder> {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    decoder: D,
    proof: Arc<dyn SecretProof>,
    errors: Arc<dyn ErrorDetailParser>,
}

impl<D: Decoder> GraphClient<D> {
    /// Creates a client from a validated configuration and its collaborators.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        decoder: D,
        proof: Arc<dyn SecretProof>,
        errors: Arc<dyn ErrorDetailParser>,
    ) -> Self {
        Self {
            config,
            transport,
            decoder,
            proof,
            errors,
        }
    }

    /// Returns the client configuration.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the decoder used for request and response documents.
    pub const fn decoder(&self) -> &D {
        &self.decoder
    }

    fn resolver(&self) -> EndpointResolver<'_> {
        EndpointResolver::new(&self.config, self.proof.as_ref())
    }

    fn encode_parameters(&self, parameters: &[Parameter], reserved: &[&str]) -> GraphResult<String> {
        codec::encode(
            &self.decoder,
            parameters,
            reserved,
            self.config.access_token.as_deref(),
        )
    }

    // --- preparation -------------------------------------------------------

    /// Prepares a `GET` or `DELETE` call; parameters go into the query.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for illegal parameters.
    pub fn prepare_query_call(
        &self,
        method: HttpMethod,
        path: &str,
        parameters: &[Parameter],
        reserved: &[&str],
    ) -> GraphResult<PreparedCall> {
        let query = self.encode_parameters(parameters, reserved)?;
        let url = self.resolver().resolve_with_query(path, false, &query)?;
        Ok(TransportRequest {
            method,
            url,
            headers: Vec::new(),
            body: RequestBody::Empty,
        })
    }

    /// Prepares a `POST` call.
    ///
    /// Without attachments the parameters form the body. With attachments
    /// the body is the multipart stream and the parameters move to the URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for illegal parameters.
    pub fn prepare_post(
        &self,
        path: &str,
        parameters: &[Parameter],
        attachments: Vec<Attachment>,
    ) -> GraphResult<PreparedCall> {
        let encoded = self.encode_parameters(parameters, &[])?;
        let resolver = self.resolver();

        if attachments.is_empty() {
            return Ok(TransportRequest {
                method: HttpMethod::Post,
                url: resolver.resolve(path, false)?,
                headers: vec![("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())],
                body: RequestBody::Buffered(Bytes::from(encoded)),
            });
        }

        let url = resolver.resolve_with_query(path, true, &encoded)?;
        Ok(TransportRequest {
            method: HttpMethod::Post,
            url,
            headers: multipart::headers(),
            body: RequestBody::Stream(multipart::encode(attachments)?),
        })
    }

    /// Prepares a `GET` of an absolute page URL.
    ///
    /// The configured access token and proof are set on the URL, replacing
    /// any already present.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a blank or relative URL.
    pub fn prepare_page_fetch(&self, url: &str) -> GraphResult<PreparedCall> {
        let url = url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(GraphError::invalid_argument(format!(
                "page URL must be absolute: '{url}'"
            )));
        }

        let url = match self.config.access_token.as_deref() {
            Some(token) => set_query_param(url, ACCESS_TOKEN_PARAM, token),
            None => url.to_string(),
        };
        Ok(TransportRequest {
            method: HttpMethod::Get,
            url: self.resolver().sign(&url)?,
            headers: Vec::new(),
            body: RequestBody::Empty,
        })
    }

    // --- execution ---------------------------------------------------------

    /// Sends a prepared call and classifies the response.
    ///
    /// # Errors
    ///
    /// Returns the transport failure or the translated remote error.
    pub async fn execute(&self, call: PreparedCall) -> GraphResult<TransportResponse> {
        let method = call.method;
        let logged_url = redact_url(&call.url);
        debug!(%method, url = %logged_url, "sending request");

        let response = self.transport.send(call).await?;
        debug!(%method, url = %logged_url, status = response.status, "received response");

        Classified::classify(response)
            .into_result(self.errors.as_ref())
            .await
            .inspect_err(|err| {
                warn!(%method, url = %logged_url, status = ?err.status(), error = %err, "request failed");
            })
    }

    async fn execute_for_bytes(&self, call: PreparedCall) -> GraphResult<Bytes> {
        self.execute(call).await?.bytes().await
    }

    async fn execute_and_decode<T: DeserializeOwned>(&self, call: PreparedCall) -> GraphResult<T> {
        let body = self.execute_for_bytes(call).await?;
        self.decoder.decode(&body)
    }

    async fn execute_page<T: DeserializeOwned>(&self, call: PreparedCall) -> GraphResult<Page<T>> {
        let origin = redact_url(&call.url);
        let page: Page<T> = self.execute_and_decode(call).await?;
        page.set_origin_url(origin);
        Ok(page)
    }

    // --- operations --------------------------------------------------------

    /// Fetches a single object.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a blank path or illegal parameters,
    /// otherwise the transport, remote or decode failure.
    pub async fn fetch_object<T: DeserializeOwned>(
        &self,
        path: &str,
        parameters: &[Parameter],
    ) -> GraphResult<T> {
        require_path(path)?;
        let call = self.prepare_query_call(HttpMethod::Get, path, parameters, &[])?;
        self.execute_and_decode(call).await
    }

    /// Fetches several objects by ID in one call.
    ///
    /// The result is keyed by ID, so `T` is usually a map type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty ID list, a blank ID or a
    /// caller-supplied `ids` parameter.
    pub async fn fetch_objects<T: DeserializeOwned, S: AsRef<str>>(
        &self,
        ids: &[S],
        parameters: &[Parameter],
    ) -> GraphResult<T> {
        let call = self.prepare_multi_fetch(ids, parameters)?;
        self.execute_and_decode(call).await
    }

    fn prepare_multi_fetch<S: AsRef<str>>(
        &self,
        ids: &[S],
        parameters: &[Parameter],
    ) -> GraphResult<PreparedCall> {
        if ids.is_empty() {
            return Err(GraphError::invalid_argument("the list of IDs cannot be empty"));
        }
        if ids.iter().any(|id| id.as_ref().trim().is_empty()) {
            return Err(GraphError::invalid_argument("IDs cannot be blank"));
        }
        codec::verify_parameter_legality(parameters, &[IDS_PARAM])?;

        let joined = ids
            .iter()
            .map(|id| id.as_ref().trim())
            .collect::<Vec<_>>()
            .join(",");
        let mut all = Vec::with_capacity(parameters.len() + 1);
        all.push(Parameter::new(IDS_PARAM, joined));
        all.extend_from_slice(parameters);

        self.prepare_query_call(HttpMethod::Get, "", &all, &[])
    }

    /// Fetches the first page of a connection.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a blank path or illegal parameters,
    /// otherwise the transport, remote or decode failure.
    pub async fn fetch_connection<T: DeserializeOwned>(
        &self,
        path: &str,
        parameters: &[Parameter],
    ) -> GraphResult<Page<T>> {
        require_path(path)?;
        let call = self.prepare_query_call(HttpMethod::Get, path, parameters, &[])?;
        self.execute_page(call).await
    }

    /// Fetches a connection page from an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a blank or relative URL, otherwise the
    /// transport, remote or decode failure.
    pub async fn fetch_connection_page<T: DeserializeOwned>(&self, url: &str) -> GraphResult<Page<T>> {
        let call = self.prepare_page_fetch(url)?;
        self.execute_page(call).await
    }

    /// Fetches the page after `page`, or `None` at the end of the connection.
    ///
    /// # Errors
    ///
    /// Returns the transport, remote or decode failure.
    pub async fn fetch_next_page<T: DeserializeOwned>(
        &self,
        page: &Page<T>,
    ) -> GraphResult<Option<Page<T>>> {
        self.fetch_adjacent_page(page, Direction::Next).await
    }

    /// Fetches the page before `page`, or `None` at the start of the connection.
    ///
    /// # Errors
    ///
    /// Returns the transport, remote or decode failure.
    pub async fn fetch_previous_page<T: DeserializeOwned>(
        &self,
        page: &Page<T>,
    ) -> GraphResult<Option<Page<T>>> {
        self.fetch_adjacent_page(page, Direction::Previous).await
    }

    async fn fetch_adjacent_page<T: DeserializeOwned>(
        &self,
        page: &Page<T>,
        direction: Direction,
    ) -> GraphResult<Option<Page<T>>> {
        match pagination::resolve(page, direction) {
            Some(url) => self.fetch_connection_page(&url).await.map(Some),
            None => Ok(None),
        }
    }

    /// Publishes to a connection, optionally with binary attachments.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a blank path or illegal parameters,
    /// otherwise the transport, remote or decode failure.
    pub async fn publish<T: DeserializeOwned>(
        &self,
        path: &str,
        parameters: &[Parameter],
        attachments: Vec<Attachment>,
    ) -> GraphResult<T> {
        require_path(path)?;
        let call = self.prepare_post(path, parameters, attachments)?;
        self.execute_and_decode(call).await
    }

    /// Deletes an object and reports whether the remote side confirmed it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a blank path or illegal parameters,
    /// otherwise the transport or remote failure.
    pub async fn delete_object(&self, path: &str, parameters: &[Parameter]) -> GraphResult<bool> {
        require_path(path)?;
        let call = self.prepare_query_call(HttpMethod::Delete, path, parameters, &[])?;
        let body = self.execute_for_bytes(call).await?;
        Ok(self.delete_succeeded(&body))
    }

    fn delete_succeeded(&self, body: &[u8]) -> bool {
        match self.decoder.decode::<Value>(body) {
            Ok(document) => interpret_delete(&document),
            Err(err) => {
                debug!(error = %err, "delete response is not a JSON document, checking raw text");
                let text = String::from_utf8_lossy(body);
                let text = text.trim();
                text == "true" || text.contains(DELETE_SUCCESS_TEXT)
            }
        }
    }

    /// Executes several calls in one request.
    ///
    /// Responses come back in request order; a `None` entry marks a
    /// sub-request the remote side did not answer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty batch, otherwise the
    /// transport, remote or decode failure of the outer request.
    pub async fn execute_batch(
        &self,
        requests: &[BatchRequest],
        attachments: Vec<Attachment>,
    ) -> GraphResult<Vec<Option<BatchResponse>>> {
        let call = self.prepare_batch(requests, attachments)?;
        self.execute_and_decode(call).await
    }

    fn prepare_batch(
        &self,
        requests: &[BatchRequest],
        attachments: Vec<Attachment>,
    ) -> GraphResult<PreparedCall> {
        if requests.is_empty() {
            return Err(GraphError::invalid_argument(
                "a batch needs at least one request",
            ));
        }
        let batch = self.decoder.encode(requests)?;
        self.prepare_post("", &[Parameter::new(BATCH_PARAM, batch)], attachments)
    }
}

fn require_path(path: &str) -> GraphResult<()> {
    if path.trim().trim_matches('/').is_empty() {
        return Err(GraphError::invalid_argument("path cannot be blank"));
    }
    Ok(())
}

fn is_true(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => text.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn interpret_delete(document: &Value) -> bool {
    match document {
        Value::Object(fields) => fields.get("success").map_or_else(
            || {
                fields
                    .get("result")
                    .and_then(Value::as_str)
                    .is_some_and(|result| result.contains(DELETE_SUCCESS_TEXT))
            },
            is_true,
        ),
        Value::String(text) => text == "true" || text.contains(DELETE_SUCCESS_TEXT),
        other => is_true(other),
    }
}
