//! Shared HTTP client state for a fetch session.

use std::sync::Arc;
use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;

use crate::error_handling::InitializationError;

/// Clients shared across fetch operations.
///
/// Two clients are kept because the redirect chain is walked manually hop
/// by hop, while the final body fetch lets the client follow redirects on
/// its own.
#[derive(Debug, Clone)]
pub struct FetchContext {
    /// Client with redirects disabled, used to observe each hop.
    pub hop_client: Arc<Client>,
    /// Client with default redirect following, used for body fetches.
    pub body_client: Arc<Client>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl FetchContext {
    /// Builds the paired clients.
    ///
    /// # Arguments
    ///
    /// * `timeout` - per-request timeout applied to every hop and body fetch.
    /// * `user_agent` - User-Agent header sent on all requests.
    ///
    /// # Errors
    ///
    /// Returns [`InitializationError::HttpClientError`] if a client cannot
    /// be constructed.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, InitializationError> {
        let hop_client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(false)
            .build()?;
        let body_client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(FetchContext {
            hop_client: Arc::new(hop_client),
            body_client: Arc::new(body_client),
            timeout,
        })
    }
}
