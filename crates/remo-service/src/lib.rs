//! Room sensor poller and HTTP REST API for Nature Remo devices.
//!
//! This crate provides a service that:
//! - Polls the Nature Remo cloud API on a schedule
//! - Falls back to synthetic readings when no token is configured or the
//!   upstream fails
//! - Serves a proxy endpoint so dashboards never hold the API token
//! - Exposes the current room snapshot and synthetic history over REST
//!
//! # REST API Endpoints
//!
//! - `GET /api/health` - Service health check
//! - `GET /api/nature-remo` - Live acquisition (always 200, see [`ProxyResponse`])
//! - `GET /api/rooms` - Current polling snapshot
//! - `POST /api/rooms/refresh` - Run one polling cycle now
//! - `GET /api/rooms/{name}/history?range=6h|24h|72h` - Synthetic history
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/remo/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [upstream]
//! base_url = "https://api.nature.global"
//! timeout_secs = 10
//!
//! [poller]
//! interval_ms = 300000
//!
//! [synthetic]
//! rooms = ["Living Room", "Bedroom", "Study"]
//! ```
//!
//! The API token is read from `NATURE_REMO_API_TOKEN` (or `upstream.token`),
//! and `REMO_POLL_INTERVAL_MS` overrides the polling period.
//!
//! [`ProxyResponse`]: remo_core::types::ProxyResponse

pub mod api;
pub mod collector;
pub mod config;
pub mod state;

pub use collector::Collector;
pub use config::{
    Config, ConfigError, PollerConfig, ServerConfig, SyntheticConfig, UpstreamConfig,
};
pub use state::AppState;
