//! Caller-side polling for the device-authorization flow.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use graphlink_domain::{AccessToken, DeviceCode, GraphError, GraphResult};

/// Polls until the user authorizes the device, the code dies, or the
/// remote side refuses.
///
/// Waits the code's interval before every poll and widens it by the same
/// amount on each slow-down answer. Once the code's lifetime has passed,
/// the last pending answer is returned.
///
/// # Errors
///
/// Returns the first error that is not a pending or slow-down answer, or
/// the last such answer once the code has expired.
pub async fn poll_for_token<F, Fut>(code: &DeviceCode, mut poll: F) -> GraphResult<AccessToken>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = GraphResult<AccessToken>>,
{
    let deadline = Instant::now() + code.lifetime();
    let step = code.poll_interval();
    let mut interval = step;

    loop {
        sleep(interval).await;

        let err = match poll().await {
            Ok(token) => return Ok(token),
            Err(err) if err.is_device_poll_retryable() => err,
            Err(err) => return Err(err),
        };

        if Instant::now() >= deadline {
            info!("device code expired before authorization");
            return Err(err);
        }
        if matches!(err, GraphError::DeviceTokenSlowDown(_)) {
            interval = widen(interval, step);
            debug!(interval_secs = interval.as_secs(), "slowing down device polling");
        } else {
            debug!("authorization pending");
        }
    }
}

fn widen(interval: Duration, step: Duration) -> Duration {
    interval + step.max(Duration::from_secs(1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use graphlink_domain::RemoteError;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn code(expires_in: u64) -> DeviceCode {
        DeviceCode {
            code: "c".to_string(),
            user_code: "U".to_string(),
            verification_uri: "https://example.com/device".to_string(),
            expires_in,
            interval: 0,
        }
    }

    fn remote() -> RemoteError {
        RemoteError::new(400, "pending").with_code(31)
    }

    #[test]
    fn test_widen_adds_step() {
        assert_eq!(
            widen(Duration::from_secs(5), Duration::from_secs(5)),
            Duration::from_secs(10)
        );
        assert_eq!(widen(Duration::ZERO, Duration::ZERO), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_polls_until_token() {
        let calls = Cell::new(0);
        let token = poll_for_token(&code(600), || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt < 3 {
                    Err(GraphError::DeviceTokenPending(remote()))
                } else {
                    Ok(AccessToken::new("t", None, None))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(token.access_token, "t");
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_terminal_error_stops_polling() {
        let calls = Cell::new(0);
        let err = poll_for_token(&code(600), || {
            calls.set(calls.get() + 1);
            async { Err(GraphError::OAuth(remote())) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, GraphError::OAuth(_)));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_expired_code_returns_last_answer() {
        let err = poll_for_token(&code(0), || async {
            Err(GraphError::DeviceTokenPending(remote()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, GraphError::DeviceTokenPending(_)));
    }
}
