//! Acquisition feeds: the live half of a polling cycle.
//!
//! A [`RoomFeed`] tries to obtain live rooms and reports one of three
//! outcomes. Falling back to synthetic data is the controller's job, so feeds
//! never fabricate readings.
//!
//! - [`DirectFeed`] holds the credential and calls the cloud API. It runs
//!   server-side.
//! - [`ProxyFeed`] calls the service's proxy endpoint and never sees the
//!   credential.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use remo_types::{ProxyResponse, RoomData};

use crate::credential::Credential;
use crate::normalize::normalize;
use crate::proxy::ProxyClient;
use crate::traits::DeviceSource;

/// Reported when a proxy claims live data but sends no rooms.
pub const MISSING_ROOM_DATA: &str = "Malformed proxy response: live data without roomData";

/// Outcome of a live acquisition attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch {
    /// Fresh rooms from the provider.
    Live(Vec<RoomData>),
    /// No credential configured. Expected; not an error.
    Unconfigured,
    /// The attempt failed; the message is safe to show to users.
    Failed(String),
}

impl Fetch {
    /// Convert to the proxy endpoint payload.
    pub fn into_proxy_response(self) -> ProxyResponse {
        match self {
            Fetch::Live(rooms) => ProxyResponse::live(rooms),
            Fetch::Unconfigured => ProxyResponse::unconfigured(),
            Fetch::Failed(message) => ProxyResponse::failed(message),
        }
    }
}

impl From<ProxyResponse> for Fetch {
    fn from(response: ProxyResponse) -> Self {
        if !response.use_mock {
            return match response.room_data {
                Some(rooms) => Fetch::Live(rooms),
                None => Fetch::Failed(MISSING_ROOM_DATA.to_string()),
            };
        }
        match response.error {
            Some(message) => Fetch::Failed(message),
            None => Fetch::Unconfigured,
        }
    }
}

/// One live acquisition attempt.
#[async_trait]
pub trait RoomFeed: Send + Sync {
    /// Try to obtain live rooms. Must not panic or return early with an error.
    async fn fetch(&self) -> Fetch;
}

/// Server-side feed calling the cloud API with a credential.
pub struct DirectFeed {
    source: Arc<dyn DeviceSource>,
    credential: Option<Credential>,
}

impl DirectFeed {
    /// Create a feed. `None` means "not configured".
    pub fn new(source: Arc<dyn DeviceSource>, credential: Option<Credential>) -> Self {
        Self { source, credential }
    }

    /// Whether a credential is configured.
    pub fn is_configured(&self) -> bool {
        self.credential.is_some()
    }
}

impl std::fmt::Debug for DirectFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectFeed")
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[async_trait]
impl RoomFeed for DirectFeed {
    async fn fetch(&self) -> Fetch {
        let Some(credential) = &self.credential else {
            debug!("No API token configured, skipping live fetch");
            return Fetch::Unconfigured;
        };

        match self.source.list_devices(credential).await {
            Ok(devices) => Fetch::Live(normalize(&devices)),
            Err(e) => Fetch::Failed(e.to_string()),
        }
    }
}

/// Dashboard-side feed calling the service's proxy endpoint.
#[derive(Debug, Clone)]
pub struct ProxyFeed {
    client: ProxyClient,
}

impl ProxyFeed {
    /// Create a feed over a proxy client.
    pub fn new(client: ProxyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RoomFeed for ProxyFeed {
    async fn fetch(&self) -> Fetch {
        match self.client.fetch().await {
            Ok(response) => Fetch::from(response),
            Err(e) => Fetch::Failed(e.to_string()),
        }
    }
}
