//! Decoder port

use serde::Serialize;
use serde::de::DeserializeOwned;

use graphlink_domain::GraphResult;

/// Port for converting between wire documents and Rust values.
pub trait Decoder: Send + Sync {
    /// Decodes a response body.
    ///
    /// # Errors
    ///
    /// Returns `Decode` if the bytes do not form a valid `T`.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> GraphResult<T>;

    /// Renders a value to its canonical string form.
    ///
    /// # Errors
    ///
    /// Returns `Decode` if the value cannot be serialized.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> GraphResult<String>;
}
