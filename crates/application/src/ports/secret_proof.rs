//! Secret proof port

use graphlink_domain::GraphResult;

/// Computes the proof that the caller holds the app secret.
pub trait SecretProof: Send + Sync {
    /// Returns the lowercase hex proof for `access_token` keyed by `app_secret`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the secret cannot be used as a key.
    fn prove(&self, access_token: &str, app_secret: &str) -> GraphResult<String>;
}
