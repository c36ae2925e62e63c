//! Client for the server-side proxy endpoint.
//!
//! Dashboards that run away from the credential talk to the service's
//! `GET /api/nature-remo` instead of the cloud API. The endpoint always
//! answers 200 and says in the body whether to fall back to synthetic data.

use std::time::Duration;

use reqwest::Client;

use remo_types::ProxyResponse;

use crate::client::{DEFAULT_TIMEOUT, normalize_base_url};
use crate::error::{Error, Result};

/// Path of the proxy endpoint.
pub const PROXY_PATH: &str = "/api/nature-remo";

/// HTTP client for the proxy endpoint.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    /// Create a new proxy client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the service (e.g., "http://localhost:8080")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a proxy client with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Client)?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the proxy payload.
    pub async fn fetch(&self) -> Result<ProxyResponse> {
        let url = format!("{}{}", self.base_url, PROXY_PATH);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::from_status(status));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Decode { url, source: e })
    }
}
