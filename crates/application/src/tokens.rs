//! Token exchange and the device authorization flow
//!
//! Token endpoints answer either with a JSON document or, on older API
//! versions, with a query string. Both shapes are accepted.
//!
//! The device flow is driven by the caller: request a code with
//! [`GraphClient::fetch_device_code`], show the user code, then call
//! [`GraphClient::obtain_device_access_token`] once per polling interval
//! until it returns a token or a non-retryable error.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use graphlink_domain::{
    AccessToken, DebugTokenInfo, DeviceCode, GraphError, GraphResult, HttpMethod, Parameter, Scope,
};

use crate::client::GraphClient;
use crate::ports::Decoder;

const TOKEN_PATH: &str = "oauth/access_token";
const DEVICE_LOGIN_PATH: &str = "device/login";
const DEVICE_STATUS_PATH: &str = "device/login_status";
const DEBUG_TOKEN_PATH: &str = "debug_token";

/// Device-login subcode: the user has not authorized yet.
pub const SUBCODE_AUTHORIZATION_PENDING: i64 = 1_349_174;
/// Device-login subcode: polling too often.
pub const SUBCODE_SLOW_DOWN: i64 = 1_349_172;
/// Device-login subcode: the device code expired.
pub const SUBCODE_CODE_EXPIRED: i64 = 1_349_152;

/// Meaning of an OAuth error returned while polling the device flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorKind {
    /// Authorization still pending
    Pending,
    /// Poll less frequently
    SlowDown,
    /// Code expired; start over
    Expired,
}

/// Maps device-login error subcodes to device-flow outcomes.
///
/// Subcodes not in the table leave the OAuth error unchanged, which ends
/// the flow (for example when the user declines).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceErrorMapping {
    subcodes: BTreeMap<i64, DeviceErrorKind>,
}

impl Default for DeviceErrorMapping {
    fn default() -> Self {
        Self::empty()
            .with(SUBCODE_AUTHORIZATION_PENDING, DeviceErrorKind::Pending)
            .with(SUBCODE_SLOW_DOWN, DeviceErrorKind::SlowDown)
            .with(SUBCODE_CODE_EXPIRED, DeviceErrorKind::Expired)
    }
}

impl DeviceErrorMapping {
    /// A mapping that recognizes no subcodes.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            subcodes: BTreeMap::new(),
        }
    }

    /// Maps `subcode` to `kind`, replacing any previous entry.
    #[must_use]
    pub fn with(mut self, subcode: i64, kind: DeviceErrorKind) -> Self {
        self.subcodes.insert(subcode, kind);
        self
    }

    /// Looks up the outcome for a subcode.
    #[must_use]
    pub fn kind_for(&self, subcode: i64) -> Option<DeviceErrorKind> {
        self.subcodes.get(&subcode).copied()
    }

    /// Rewrites a mapped OAuth error into its device-flow variant.
    #[must_use]
    pub fn translate(&self, error: GraphError) -> GraphError {
        let GraphError::OAuth(remote) = error else {
            return error;
        };
        match remote.subcode.and_then(|subcode| self.kind_for(subcode)) {
            Some(DeviceErrorKind::Pending) => GraphError::DeviceTokenPending(remote),
            Some(DeviceErrorKind::SlowDown) => GraphError::DeviceTokenSlowDown(remote),
            Some(DeviceErrorKind::Expired) => GraphError::DeviceTokenExpired(remote),
            None => GraphError::OAuth(remote),
        }
    }
}

#[derive(Deserialize)]
struct TokenDocument {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

fn verify_presence(name: &str, value: &str) -> GraphResult<()> {
    if value.trim().is_empty() {
        return Err(GraphError::invalid_argument(format!("{name} cannot be blank")));
    }
    Ok(())
}

impl<D: Decoder> GraphClient<D> {
    fn require_access_token(&self, operation: &str) -> GraphResult<&str> {
        self.config().access_token.as_deref().ok_or_else(|| {
            GraphError::illegal_state(format!("an access token is required to {operation}"))
        })
    }

    fn token_from_body(&self, body: &[u8]) -> GraphResult<AccessToken> {
        match self.decoder().decode::<TokenDocument>(body) {
            Ok(document) => Ok(AccessToken::new(
                document.access_token,
                document.token_type,
                document.expires_in,
            )),
            Err(err) => {
                debug!(error = %err, "token response is not a JSON document, parsing as query string");
                let text = std::str::from_utf8(body)
                    .map_err(|e| GraphError::Decode(format!("token response is not UTF-8: {e}")))?;
                AccessToken::from_query_string(text)
            }
        }
    }

    async fn request_token(
        &self,
        method: HttpMethod,
        path: &str,
        parameters: &[Parameter],
    ) -> GraphResult<AccessToken> {
        let call = match method {
            HttpMethod::Post => self.prepare_post(path, parameters, Vec::new())?,
            _ => self.prepare_query_call(method, path, parameters, &[])?,
        };
        let body = self.execute(call).await?.bytes().await?;
        self.token_from_body(&body)
    }

    async fn get_decoded<T: DeserializeOwned>(
        &self,
        path: &str,
        parameters: &[Parameter],
    ) -> GraphResult<T> {
        let call = self.prepare_query_call(HttpMethod::Get, path, parameters, &[])?;
        let body = self.execute(call).await?.bytes().await?;
        self.decoder().decode(&body)
    }

    /// Obtains an app access token with the client-credentials grant.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for blank credentials, otherwise the
    /// transport, remote or decode failure.
    pub async fn obtain_app_access_token(
        &self,
        app_id: &str,
        app_secret: &str,
    ) -> GraphResult<AccessToken> {
        verify_presence("app_id", app_id)?;
        verify_presence("app_secret", app_secret)?;

        let parameters = [
            Parameter::new("grant_type", "client_credentials"),
            Parameter::new("client_id", app_id),
            Parameter::new("client_secret", app_secret),
        ];
        self.request_token(HttpMethod::Get, TOKEN_PATH, &parameters)
            .await
    }

    /// Exchanges an authorization code for a user access token.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for blank credentials or code, otherwise
    /// the transport, remote or decode failure.
    pub async fn obtain_user_access_token(
        &self,
        app_id: &str,
        app_secret: &str,
        redirect_uri: &str,
        verification_code: &str,
    ) -> GraphResult<AccessToken> {
        verify_presence("app_id", app_id)?;
        verify_presence("app_secret", app_secret)?;
        verify_presence("verification_code", verification_code)?;

        let parameters = [
            Parameter::new("client_id", app_id),
            Parameter::new("client_secret", app_secret),
            Parameter::new("code", verification_code),
            Parameter::new("redirect_uri", redirect_uri),
        ];
        self.request_token(HttpMethod::Get, TOKEN_PATH, &parameters)
            .await
    }

    /// Exchanges a short-lived token for a long-lived one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for blank inputs, otherwise the transport,
    /// remote or decode failure.
    pub async fn obtain_extended_access_token(
        &self,
        app_id: &str,
        app_secret: &str,
        access_token: &str,
    ) -> GraphResult<AccessToken> {
        verify_presence("app_id", app_id)?;
        verify_presence("app_secret", app_secret)?;
        verify_presence("access_token", access_token)?;

        let parameters = [
            Parameter::new("client_id", app_id),
            Parameter::new("client_secret", app_secret),
            Parameter::new("grant_type", "fb_exchange_token"),
            Parameter::new("fb_exchange_token", access_token),
        ];
        self.request_token(HttpMethod::Get, TOKEN_PATH, &parameters)
            .await
    }

    /// Extends the access token this client was configured with.
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` if no access token is configured.
    pub async fn obtain_extended_access_token_for_configured(
        &self,
        app_id: &str,
        app_secret: &str,
    ) -> GraphResult<AccessToken> {
        let token = self.require_access_token("extend it")?.to_string();
        self.obtain_extended_access_token(app_id, app_secret, &token)
            .await
    }

    /// Starts the device flow and returns the code to show the user.
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` if no access token is configured, otherwise
    /// the transport, remote or decode failure.
    pub async fn fetch_device_code(&self, scope: &Scope) -> GraphResult<DeviceCode> {
        self.require_access_token("fetch a device code")?;

        let parameters = [
            Parameter::new("type", "device_code"),
            Parameter::new("scope", scope.to_string()),
        ];
        let call = self.prepare_post(DEVICE_LOGIN_PATH, &parameters, Vec::new())?;
        let body = self.execute(call).await?.bytes().await?;
        self.decoder().decode(&body)
    }

    /// Polls once for the token of a device-flow code.
    ///
    /// # Errors
    ///
    /// Returns `DeviceTokenPending` or `DeviceTokenSlowDown` while the user
    /// has not finished, `DeviceTokenExpired` once the code is dead, and an
    /// unmapped `OAuth` error when authorization was refused. Returns
    /// `IllegalState` if no access token is configured.
    pub async fn obtain_device_access_token(&self, code: &str) -> GraphResult<AccessToken> {
        verify_presence("code", code)?;
        self.require_access_token("poll for a device token")?;

        let parameters = [
            Parameter::new("type", "device_token"),
            Parameter::new("code", code),
        ];
        self.request_token(HttpMethod::Post, DEVICE_STATUS_PATH, &parameters)
            .await
            .map_err(|err| self.config().device_errors.translate(err))
    }

    /// Inspects a token: owner, validity, expiry and granted scopes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a blank token, otherwise the
    /// transport, remote or decode failure.
    pub async fn debug_token(&self, input_token: &str) -> GraphResult<DebugTokenInfo> {
        verify_presence("input_token", input_token)?;

        let envelope: DataEnvelope<DebugTokenInfo> = self
            .get_decoded(DEBUG_TOKEN_PATH, &[Parameter::new("input_token", input_token)])
            .await?;
        Ok(envelope.data)
    }
}
