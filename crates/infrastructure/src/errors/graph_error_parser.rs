//! `ErrorDetailParser` for graph API error documents.
//!
//! Two shapes are recognized:
//!
//! ```text
//! {"error": {"message": "...", "type": "OAuthException", "code": 190, "error_subcode": 460, ...}}
//! {"error_code": 100, "error_msg": "..."}
//! ```

use serde::Deserialize;

use graphlink_application::ports::ErrorDetailParser;
use graphlink_domain::{GraphError, RemoteError};

const OAUTH_EXCEPTION: &str = "OAuthException";
const RATE_LIMIT_CODES: [i64; 4] = [4, 17, 32, 613];
const PERMISSION_CODE: i64 = 10;
const PERMISSION_CODE_RANGE: std::ops::RangeInclusive<i64> = 200..=299;

#[derive(Debug, Deserialize)]
struct ErrorDocument {
    #[serde(default)]
    error: Option<ErrorBody>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    error_subcode: Option<i64>,
    #[serde(default)]
    error_user_title: Option<String>,
    #[serde(default)]
    error_user_msg: Option<String>,
    #[serde(default)]
    is_transient: bool,
    #[serde(default)]
    fbtrace_id: Option<String>,
}

/// Parses graph API error documents into typed errors.
///
/// Classification:
/// - type `OAuthException` → `OAuth`
/// - codes 4, 17, 32, 613 → `RateLimit`
/// - code 10 or 200–299 → `Permission`
/// - anything else → `Api`
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphErrorParser;

impl GraphErrorParser {
    fn classify(remote: RemoteError) -> GraphError {
        if remote.error_type.as_deref() == Some(OAUTH_EXCEPTION) {
            return GraphError::OAuth(remote);
        }
        match remote.code {
            Some(code) if RATE_LIMIT_CODES.contains(&code) => GraphError::RateLimit(remote),
            Some(code) if code == PERMISSION_CODE || PERMISSION_CODE_RANGE.contains(&code) => {
                GraphError::Permission(remote)
            }
            _ => GraphError::Api(remote),
        }
    }

    fn from_body(body: ErrorBody, status: u16) -> Option<RemoteError> {
        if body.message.is_none() && body.code.is_none() {
            return None;
        }
        Some(RemoteError {
            http_status: status,
            code: body.code,
            subcode: body.error_subcode,
            message: body.message.unwrap_or_default(),
            error_type: body.error_type,
            user_title: body.error_user_title,
            user_message: body.error_user_msg,
            is_transient: body.is_transient,
            trace_id: body.fbtrace_id,
        })
    }
}

impl ErrorDetailParser for GraphErrorParser {
    fn parse(&self, body: &str, status: u16) -> Option<GraphError> {
        let document: ErrorDocument = serde_json::from_str(body).ok()?;

        let remote = match document.error {
            Some(error) => Self::from_body(error, status)?,
            None => {
                let code = document.error_code?;
                let mut remote =
                    RemoteError::new(status, document.error_msg.unwrap_or_default());
                remote.code = Some(code);
                remote
            }
        };

        Some(Self::classify(remote))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(body: &str) -> Option<GraphError> {
        GraphErrorParser.parse(body, 400)
    }

    #[test]
    fn test_generic_api_error() {
        let err = parse(r#"{"error":{"message":"Invalid","code":100}}"#).unwrap();
        assert_eq!(err, GraphError::Api(RemoteError::new(400, "Invalid").with_code(100)));
    }

    #[test]
    fn test_full_oauth_error() {
        let err = parse(
            r#"{"error":{"message":"Error validating access token","type":"OAuthException","code":190,"error_subcode":463,"error_user_title":"Session expired","error_user_msg":"Log in again","is_transient":false,"fbtrace_id":"AbC"}}"#,
        )
        .unwrap();
        let GraphError::OAuth(remote) = err else {
            panic!("expected OAuth error, got {err:?}");
        };
        assert_eq!(remote.code, Some(190));
        assert_eq!(remote.subcode, Some(463));
        assert_eq!(remote.user_title.as_deref(), Some("Session expired"));
        assert_eq!(remote.user_message.as_deref(), Some("Log in again"));
        assert_eq!(remote.trace_id.as_deref(), Some("AbC"));
    }

    #[test]
    fn test_rate_limit_and_permission_codes() {
        for code in RATE_LIMIT_CODES {
            let body = format!(r#"{{"error":{{"message":"slow","code":{code},"is_transient":true}}}}"#);
            let err = parse(&body).unwrap();
            assert!(matches!(err, GraphError::RateLimit(_)), "code {code}");
            assert!(err.is_transient());
        }
        for code in [10, 200, 250, 299] {
            let body = format!(r#"{{"error":{{"message":"nope","code":{code}}}}}"#);
            assert!(matches!(parse(&body), Some(GraphError::Permission(_))), "code {code}");
        }
        assert!(matches!(
            parse(r#"{"error":{"message":"x","code":300}}"#),
            Some(GraphError::Api(_))
        ));
    }

    #[test]
    fn test_oauth_type_wins_over_code() {
        assert!(matches!(
            parse(r#"{"error":{"message":"x","type":"OAuthException","code":4}}"#),
            Some(GraphError::OAuth(_))
        ));
    }

    #[test]
    fn test_legacy_shape() {
        let err = GraphErrorParser
            .parse(r#"{"error_code":190,"error_msg":"Invalid OAuth 2.0 Access Token"}"#, 401)
            .unwrap();
        assert_eq!(
            err,
            GraphError::Api(RemoteError::new(401, "Invalid OAuth 2.0 Access Token").with_code(190))
        );
    }

    #[test]
    fn test_unrecognized_bodies() {
        assert_eq!(parse("not json"), None);
        assert_eq!(parse(r#"{"data":[]}"#), None);
        assert_eq!(parse(r#"{"error":{}}"#), None);
        assert_eq!(parse(r#"{"error":"invalid_request"}"#), None);
    }
}
