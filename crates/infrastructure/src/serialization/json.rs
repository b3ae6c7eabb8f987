//! `Decoder` implementation using `serde_json`.

use serde::Serialize;
use serde::de::DeserializeOwned;

use graphlink_application::ports::Decoder;
use graphlink_domain::{GraphError, GraphResult};

/// Decoder for JSON wire documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    /// Deserializes JSON from bytes.
    ///
    /// Handles both pretty-printed and minified JSON.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> GraphResult<T> {
        serde_json::from_slice(bytes)
            .map_err(|e| GraphError::Decode(format!("JSON deserialization failed: {e}")))
    }

    /// Serializes a value to compact JSON.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> GraphResult<String> {
        serde_json::to_string(value)
            .map_err(|e| GraphError::Decode(format!("JSON serialization failed: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use graphlink_domain::{BatchRequest, Page};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn test_decode_typed_page() {
        let page: Page<BTreeMap<String, String>> = JsonDecoder
            .decode(br#"{"data":[{"id":"1"}],"paging":{"next":"https://h/next"}}"#)
            .unwrap();
        assert_eq!(page.data[0]["id"], "1");
        assert_eq!(
            page.paging.unwrap().next.as_deref(),
            Some("https://h/next")
        );
    }

    #[test]
    fn test_decode_failure_is_decode_error() {
        let result: GraphResult<Vec<u32>> = JsonDecoder.decode(b"{not json");
        assert!(matches!(result, Err(GraphError::Decode(_))));
    }

    #[test]
    fn test_encode_is_compact() {
        let requests = [BatchRequest::builder("me").build().unwrap()];
        let json = JsonDecoder.encode(&requests[..]).unwrap();
        assert_eq!(
            json,
            r#"[{"method":"GET","relative_url":"me","omit_response_on_success":true}]"#
        );
    }
}
