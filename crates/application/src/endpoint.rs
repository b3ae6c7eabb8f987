//! Endpoint URL construction

use graphlink_domain::{ApiVersion, GraphResult};

use crate::codec::APPSECRET_PROOF_PARAM;
use crate::config::{ClientConfig, Endpoints};
use crate::ports::SecretProof;
use crate::query::set_query_param;

/// Path suffixes that go to the video upload host when sent with attachments.
const VIDEO_UPLOAD_SUFFIXES: &[&str] = &["/videos", "/advideos"];

/// Returns `path` with exactly one leading separator.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim().trim_start_matches('/'))
}

/// Returns true if an attachment call to `path` is a video upload.
#[must_use]
pub fn is_video_upload(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or_default().trim_end_matches('/');
    VIDEO_UPLOAD_SUFFIXES
        .iter()
        .any(|suffix| path.ends_with(suffix))
}

/// Builds the unsigned absolute URL for an API call.
#[must_use]
pub fn endpoint_url(
    endpoints: &Endpoints,
    version: ApiVersion,
    path: &str,
    has_attachment: bool,
) -> String {
    let path = normalize_path(path);
    let base = if has_attachment && is_video_upload(&path) {
        &endpoints.graph_video
    } else {
        &endpoints.graph
    };

    match version.url_element() {
        Some(element) => format!("{base}/{element}{path}"),
        None => format!("{base}{path}"),
    }
}

/// Resolves request URLs and signs them with the app-secret proof.
pub struct EndpointResolver<'a> {
    config: &'a ClientConfig,
    proof: &'a dyn SecretProof,
}

impl<'a> EndpointResolver<'a> {
    /// Creates a resolver over a client configuration.
    #[must_use]
    pub fn new(config: &'a ClientConfig, proof: &'a dyn SecretProof) -> Self {
        Self { config, proof }
    }

    /// Builds the absolute, signed URL for a call to `path`.
    ///
    /// # Errors
    ///
    /// Propagates a failure to compute the proof.
    pub fn resolve(&self, path: &str, has_attachment: bool) -> GraphResult<String> {
        self.resolve_with_query(path, has_attachment, "")
    }

    /// Like [`resolve`](Self::resolve), with an encoded query string
    /// placed ahead of the proof.
    ///
    /// # Errors
    ///
    /// Propagates a failure to compute the proof.
    pub fn resolve_with_query(
        &self,
        path: &str,
        has_attachment: bool,
        query: &str,
    ) -> GraphResult<String> {
        let mut url = endpoint_url(
            &self.config.endpoints,
            self.config.api_version,
            path,
            has_attachment,
        );
        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(query);
        }
        self.sign(&url)
    }

    /// Adds `appsecret_proof` to the query of `url` when both the access
    /// token and app secret are configured. An existing proof is replaced.
    ///
    /// # Errors
    ///
    /// Propagates a failure to compute the proof.
    pub fn sign(&self, url: &str) -> GraphResult<String> {
        match self.config.proof_credentials() {
            Some((token, secret)) => {
                let proof = self.proof.prove(token, secret)?;
                Ok(set_query_param(url, APPSECRET_PROOF_PARAM, &proof))
            }
            None => Ok(url.to_string()),
        }
    }
}
