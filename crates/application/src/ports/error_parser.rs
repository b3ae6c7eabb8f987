//! Error detail parser port

use graphlink_domain::GraphError;

/// Recognizes structured error payloads in failed responses.
pub trait ErrorDetailParser: Send + Sync {
    /// Parses a response body returned with `status`.
    ///
    /// Returns `None` when the body is not a recognized error document.
    fn parse(&self, body: &str, status: u16) -> Option<GraphError>;
}
