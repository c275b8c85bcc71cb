//! API client entry point.
//!
//! Owns the transport, session state, and signer, and mints single-use
//! [`RequestBuilder`]s. All capabilities are injected at construction so the
//! whole engine runs against mocks in tests.

use std::sync::Arc;

use fg_core::config::ClientConfig;
use fg_core::error::FgResult;

use crate::request::RequestBuilder;
use crate::session::SessionState;
use crate::sign::{PassthroughSigner, Signer};
use crate::transport::{HttpTransport, Transport};

/// Client for the fotogram private API.
#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionState>,
    signer: Arc<dyn Signer>,
}

impl ApiClient {
    /// Create a client with the production HTTP transport.
    pub fn new(config: ClientConfig, session: Arc<dyn SessionState>) -> FgResult<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config)?);
        Ok(Self {
            config,
            transport,
            session,
            signer: Arc::new(PassthroughSigner),
        })
    }

    /// Replace the body signer (the default passes fields through unchanged).
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = signer;
        self
    }

    /// Replace the transport. Used by tests and alternate network stacks.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// The session state this client was built with.
    pub fn session(&self) -> &Arc<dyn SessionState> {
        &self.session
    }

    /// The active client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start a request against the given endpoint.
    ///
    /// Relative endpoints resolve against the configured API version's base
    /// URL; absolute URLs pass through verbatim.
    pub fn request(&self, endpoint: &str) -> RequestBuilder {
        RequestBuilder::new(
            endpoint,
            self.config.api_version,
            self.transport.clone(),
            self.session.clone(),
            self.signer.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySession;

    #[test]
    fn test_client_builds_from_default_config() {
        let client = ApiClient::new(ClientConfig::default(), Arc::new(MemorySession::new()));
        assert!(client.is_ok());
    }

    #[test]
    fn test_builders_are_independent() {
        let client = ApiClient::new(ClientConfig::default(), Arc::new(MemorySession::new()))
            .unwrap();
        // Two builders from one client share capabilities but not state.
        let _a = client.request("feed/timeline/");
        let _b = client.request("media/like/");
    }
}
