//! Response classification
//!
//! Only `200 OK` passes. A failed response keeps its body stream unread
//! until the error is actually requested, so dropping a failed response
//! never pays for reading its body.

use graphlink_domain::GraphError;

use crate::ports::{ErrorDetailParser, TransportResponse};

/// Statuses whose bodies may carry a structured error document.
pub const CHECKED_ERROR_STATUSES: [u16; 6] = [400, 401, 404, 500, 403, 304];

const HTTP_OK: u16 = 200;

/// Outcome of classifying a transport response.
#[derive(Debug)]
pub enum Classified {
    /// The response succeeded and is handed through unchanged.
    Passed(TransportResponse),
    /// The response failed; its body has not been read yet.
    Failed(FailedResponse),
}

impl Classified {
    /// Classifies a response by status alone.
    #[must_use]
    pub fn classify(response: TransportResponse) -> Self {
        if response.status == HTTP_OK {
            Self::Passed(response)
        } else {
            Self::Failed(FailedResponse { response })
        }
    }

    /// Returns the passed response, or reads and translates the failure.
    ///
    /// # Errors
    ///
    /// Returns the translated remote error for a failed response.
    pub async fn into_result(
        self,
        parser: &dyn ErrorDetailParser,
    ) -> Result<TransportResponse, GraphError> {
        match self {
            Self::Passed(response) => Ok(response),
            Self::Failed(failed) => Err(failed.into_error(parser).await),
        }
    }
}

/// A non-`200` response whose body is still unread.
#[derive(Debug)]
pub struct FailedResponse {
    response: TransportResponse,
}

impl FailedResponse {
    /// HTTP status of the failed response.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.response.status
    }

    /// Returns true if the body will be inspected for a structured error.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        CHECKED_ERROR_STATUSES.contains(&self.status())
    }

    /// Reads the body and translates it into an error.
    ///
    /// Checked statuses hand the UTF-8 body to `parser`; anything it does
    /// not recognize, and every unchecked status, becomes `Network`.
    pub async fn into_error(self, parser: &dyn ErrorDetailParser) -> GraphError {
        let status = self.status();
        if !self.is_checked() {
            return GraphError::network_status(status);
        }

        match self.response.text().await {
            Ok(body) => parser
                .parse(&body, status)
                .unwrap_or_else(|| GraphError::network_status(status)),
            Err(GraphError::Decode(_)) => GraphError::network_status(status),
            Err(err) => err,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::testing::{FailingBody, StubErrorParser};
    use graphlink_domain::RemoteError;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_ok_passes_through_unread() {
        let response = TransportResponse::new(200, FailingBody::stream());
        let Classified::Passed(passed) = Classified::classify(response) else {
            panic!("200 must pass");
        };
        assert_eq!(passed.status, 200);
    }

    #[tokio::test]
    async fn test_checked_status_with_structured_body() {
        let response = TransportResponse::from_bytes(
            400,
            r#"{"error":{"message":"Invalid","code":100}}"#,
        );
        let err = Classified::classify(response)
            .into_result(&StubErrorParser)
            .await
            .unwrap_err();
        assert_eq!(err, GraphError::Api(RemoteError::new(400, "Invalid").with_code(100)));
    }

    #[tokio::test]
    async fn test_checked_status_with_unrecognized_body() {
        let response = TransportResponse::from_bytes(400, "<html>bad gateway</html>");
        let err = Classified::classify(response)
            .into_result(&StubErrorParser)
            .await
            .unwrap_err();
        assert_eq!(err, GraphError::network_status(400));
    }

    #[tokio::test]
    async fn test_checked_status_with_non_utf8_body() {
        let response = TransportResponse::from_bytes(500, vec![0xff, 0xfe]);
        let err = Classified::classify(response)
            .into_result(&StubErrorParser)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(matches!(err, GraphError::Network { .. }));
    }

    #[tokio::test]
    async fn test_unchecked_status_never_reads_body() {
        for status in [201, 302, 429, 502, 503] {
            let response = TransportResponse::new(status, FailingBody::stream());
            let Classified::Failed(failed) = Classified::classify(response) else {
                panic!("{status} must fail");
            };
            assert!(!failed.is_checked());
            assert_eq!(
                failed.into_error(&StubErrorParser).await,
                GraphError::network_status(status)
            );
        }
    }
}
