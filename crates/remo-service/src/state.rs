//! Application state shared across handlers.
//!
//! The polling controller and the proxy endpoint share one feed, so the
//! credential lives in exactly one place and never reaches a response body.

use std::sync::Arc;

use time::OffsetDateTime;

use remo_core::{
    DirectFeed, PollerOptions, PollingController, RoomFeed, SensorClient, SyntheticGenerator,
};

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// Configuration, after environment overrides.
    pub config: Config,
    /// Live acquisition used by the proxy endpoint and the controller.
    pub feed: Arc<dyn RoomFeed>,
    /// Background polling controller.
    pub controller: Arc<PollingController>,
    /// Generator for synthetic history series.
    pub generator: SyntheticGenerator,
    /// When the service started.
    pub started_at: OffsetDateTime,
}

impl AppState {
    /// Create state that polls the cloud API described by `config`.
    pub fn new(config: Config) -> remo_core::Result<Arc<Self>> {
        let client =
            SensorClient::with_timeout(&config.upstream.base_url, config.upstream.timeout())?;
        let feed = DirectFeed::new(Arc::new(client), config.credential());
        Ok(Self::with_feed(config, Arc::new(feed)))
    }

    /// Create state around an existing feed.
    pub fn with_feed(config: Config, feed: Arc<dyn RoomFeed>) -> Arc<Self> {
        let generator = SyntheticGenerator::new(config.synthetic.rooms.iter().cloned());
        let options = PollerOptions::new()
            .interval(config.poller.interval())
            .generator(generator.clone());
        let controller = Arc::new(PollingController::new(Arc::clone(&feed), options));

        Arc::new(Self {
            config,
            feed,
            controller,
            generator,
            started_at: OffsetDateTime::now_utc(),
        })
    }
}
