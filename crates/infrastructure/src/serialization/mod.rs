//! JSON encoding and decoding of wire documents.
//!
//! Remote documents use `snake_case` field names, which serde's default
//! field naming already matches, so no renaming strategy is applied.

mod json;

pub use json::JsonDecoder;
