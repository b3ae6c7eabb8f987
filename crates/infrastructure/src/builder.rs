//! Default wiring of a [`GraphClient`].

use std::sync::Arc;
use std::time::Duration;

use graphlink_application::ports::{ErrorDetailParser, SecretProof, Transport};
use graphlink_application::{ClientConfig, GraphClient};
use graphlink_domain::GraphResult;

use crate::adapters::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, ReqwestTransport};
use crate::auth::HmacSha256Proof;
use crate::errors::GraphErrorParser;
use crate::serialization::JsonDecoder;

/// Builds a [`GraphClient`] with the default adapters.
///
/// Any collaborator can be replaced; the rest fall back to
/// [`ReqwestTransport`], [`HmacSha256Proof`] and [`GraphErrorParser`].
pub struct GraphClientBuilder {
    config: ClientConfig,
    user_agent: String,
    timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
    proof: Option<Arc<dyn SecretProof>>,
    errors: Option<Arc<dyn ErrorDetailParser>>,
}

impl GraphClientBuilder {
    /// Starts from a configuration.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            transport: None,
            proof: None,
            errors: None,
        }
    }

    /// Starts from the `GRAPHLINK_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a malformed variable.
    pub fn from_env() -> GraphResult<Self> {
        ClientConfig::from_env().map(Self::new)
    }

    /// Sets the user agent of the default transport.
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Sets the request timeout of the default transport.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Uses a custom transport instead of reqwest.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Uses a custom secret proof.
    #[must_use]
    pub fn secret_proof(mut self, proof: Arc<dyn SecretProof>) -> Self {
        self.proof = Some(proof);
        self
    }

    /// Uses a custom error detail parser.
    #[must_use]
    pub fn error_parser(mut self, errors: Arc<dyn ErrorDetailParser>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Validates the configuration and builds the client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an invalid configuration and `Network`
    /// if the default transport cannot be created.
    pub fn build(self) -> GraphResult<GraphClient<JsonDecoder>> {
        let config = self.config.validate()?;
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_settings(
                &self.user_agent,
                self.timeout,
            )?),
        };

        Ok(GraphClient::new(
            config,
            transport,
            JsonDecoder,
            self.proof.unwrap_or_else(|| Arc::new(HmacSha256Proof)),
            self.errors.unwrap_or_else(|| Arc::new(GraphErrorParser)),
        ))
    }
}
