//! HMAC-SHA256 app-secret proof.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use graphlink_application::ports::SecretProof;
use graphlink_domain::{GraphError, GraphResult};

type HmacSha256 = Hmac<Sha256>;

/// Computes `hex(HMAC-SHA256(key = app secret, message = access token))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha256Proof;

impl SecretProof for HmacSha256Proof {
    fn prove(&self, access_token: &str, app_secret: &str) -> GraphResult<String> {
        let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
            .map_err(|e| GraphError::invalid_argument(format!("unusable app secret: {e}")))?;
        mac.update(access_token.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rfc4231_vector() {
        let proof = HmacSha256Proof
            .prove("what do ya want for nothing?", "Jefe")
            .unwrap();
        assert_eq!(
            proof,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_proof_depends_on_both_inputs() {
        let a = HmacSha256Proof.prove("token", "secret").unwrap();
        let b = HmacSha256Proof.prove("token", "other").unwrap();
        let c = HmacSha256Proof.prove("other", "secret").unwrap();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
