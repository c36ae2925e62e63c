//! HTTP client for the Nature Remo cloud API.
//!
//! Only the device listing endpoint is used. Each call is a live read with no
//! caching and no retries; retry cadence belongs to the polling controller.
//!
//! # Example
//!
//! ```no_run
//! use remo_core::{Credential, SensorClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SensorClient::new(remo_core::client::DEFAULT_BASE_URL)?;
//! let credential = Credential::new("token").expect("non-empty token");
//!
//! let devices = client.list_devices(&credential).await?;
//! println!("{} devices", devices.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL};
use tracing::debug;

use remo_types::Device;

use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::traits::DeviceSource;

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.nature.global";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the device listing endpoint.
#[derive(Debug, Clone)]
pub struct SensorClient {
    client: Client,
    base_url: String,
}

impl SensorClient {
    /// Create a client with the default timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root (e.g., "https://api.nature.global")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("remo-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Client)?;

        Self::with_client(base_url, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List devices visible to `credential`.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] for any non-2xx status
    /// - [`Error::Network`] when no response was received
    /// - [`Error::Decode`] when the body is not a device array
    pub async fn list_devices(&self, credential: &Credential) -> Result<Vec<Device>> {
        let url = format!("{}/1/devices", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", credential.expose()))
            .header(CACHE_CONTROL, "no-cache")
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

        let devices: Vec<Device> = response
            .json()
            .await
            .map_err(|e| Error::Decode { url, source: e })?;

        debug!("Listed {} device(s)", devices.len());
        Ok(devices)
    }
}

#[async_trait]
impl DeviceSource for SensorClient {
    async fn list_devices(&self, credential: &Credential) -> Result<Vec<Device>> {
        SensorClient::list_devices(self, credential).await
    }
}

/// Trim trailing slashes and require an http(s) scheme.
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String> {
    let base_url = base_url.trim().trim_end_matches('/').to_string();

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(Error::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            base_url
        )));
    }

    Ok(base_url)
}
