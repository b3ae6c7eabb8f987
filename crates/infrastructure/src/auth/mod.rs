//! App-secret proof.

mod hmac_proof;

pub use hmac_proof::HmacSha256Proof;
