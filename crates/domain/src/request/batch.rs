//! Batch request and response types
//!
//! A batch bundles several logical API calls into a single `POST`. Each
//! sub-request is serialized to JSON and sent in the `batch` parameter.

use serde::{Deserialize, Serialize};

use super::{HttpMethod, Parameter};
use crate::error::{GraphError, GraphResult};

/// A header on a batch sub-request or sub-response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHeader {
    /// Header name
    pub name: String,
    /// Header value
    pub value: String,
}

/// A single call inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// HTTP method of the sub-request
    pub method: HttpMethod,
    /// Path relative to the versioned endpoint, including any query string
    pub relative_url: String,
    /// Form-encoded body for `POST` sub-requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Name other sub-requests can reference in `JSONPath` expressions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Suppress the response body when the sub-request succeeds
    #[serde(default = "default_omit_response")]
    pub omit_response_on_success: bool,
    /// Name of the sub-request this one depends on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    /// Comma-separated names of multipart attachments used by this sub-request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_files: Option<String>,
    /// Extra headers for the sub-request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<BatchHeader>,
}

const fn default_omit_response() -> bool {
    true
}

impl BatchRequest {
    /// Starts building a sub-request against the given relative path.
    #[must_use]
    pub fn builder(relative_url: impl Into<String>) -> BatchRequestBuilder {
        BatchRequestBuilder::new(relative_url)
    }
}

/// Builder for [`BatchRequest`].
#[derive(Debug, Clone)]
pub struct BatchRequestBuilder {
    relative_url: String,
    method: HttpMethod,
    parameters: Vec<Parameter>,
    name: Option<String>,
    omit_response_on_success: bool,
    depends_on: Option<String>,
    attached_files: Option<String>,
    headers: Vec<BatchHeader>,
}

impl BatchRequestBuilder {
    fn new(relative_url: impl Into<String>) -> Self {
        Self {
            relative_url: relative_url.into(),
            method: HttpMethod::Get,
            parameters: Vec::new(),
            name: None,
            omit_response_on_success: true,
            depends_on: None,
            attached_files: None,
            headers: Vec::new(),
        }
    }

    /// Sets the HTTP method (defaults to `GET`).
    #[must_use]
    pub const fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Adds call parameters.
    #[must_use]
    pub fn parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Names this sub-request so others can depend on it.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Controls whether the response body is omitted on success.
    #[must_use]
    pub const fn omit_response_on_success(mut self, omit: bool) -> Self {
        self.omit_response_on_success = omit;
        self
    }

    /// Marks this sub-request as depending on another named one.
    #[must_use]
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on = Some(name.into());
        self
    }

    /// References multipart attachments by name.
    #[must_use]
    pub fn attached_files(mut self, names: impl Into<String>) -> Self {
        self.attached_files = Some(names.into());
        self
    }

    /// Adds a header to the sub-request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(BatchHeader {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Builds the sub-request.
    ///
    /// Parameters go into the relative URL's query string for `GET` and
    /// `DELETE`, and into the form-encoded body for `POST`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the relative URL is blank or a parameter
    /// cannot be encoded.
    pub fn build(self) -> GraphResult<BatchRequest> {
        if self.relative_url.trim().is_empty() {
            return Err(GraphError::invalid_argument(
                "batch request relative URL cannot be blank",
            ));
        }

        let encoded = encode_parameters(&self.parameters)?;
        let (relative_url, body) = if encoded.is_empty() {
            (self.relative_url, None)
        } else if self.method.has_body() {
            (self.relative_url, Some(encoded))
        } else {
            let separator = if self.relative_url.contains('?') { '&' } else { '?' };
            (format!("{}{separator}{encoded}", self.relative_url), None)
        };

        Ok(BatchRequest {
            method: self.method,
            relative_url,
            body,
            name: self.name,
            omit_response_on_success: self.omit_response_on_success,
            depends_on: self.depends_on,
            attached_files: self.attached_files,
            headers: self.headers,
        })
    }
}

fn encode_parameters(parameters: &[Parameter]) -> GraphResult<String> {
    let pairs = parameters
        .iter()
        .map(|p| {
            let value = p.value().render_with(|json| {
                serde_json::to_string(json).map_err(|e| {
                    GraphError::invalid_argument(format!("cannot encode batch parameter: {e}"))
                })
            })?;
            Ok((p.name(), value))
        })
        .collect::<GraphResult<Vec<_>>>()?;

    serde_urlencoded::to_string(&pairs)
        .map_err(|e| GraphError::invalid_argument(format!("cannot encode batch parameters: {e}")))
}

/// The result of one sub-request, in the same position as its request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    /// HTTP status of the sub-request
    pub code: u16,
    /// Response headers of the sub-request
    #[serde(default)]
    pub headers: Vec<BatchHeader>,
    /// Raw response body (JSON text), absent when omitted on success
    #[serde(default)]
    pub body: Option<String>,
}

impl BatchResponse {
    /// Returns true if the sub-request succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// Looks up a response header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}
