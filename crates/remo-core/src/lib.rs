//! Acquisition core for Nature Remo room sensors.
//!
//! This crate turns the Nature Remo cloud API into a steady stream of
//! per-room readings, falling back to synthetic data whenever live data is
//! unavailable.
//!
//! # Features
//!
//! - **Device listing**: authenticated `GET /1/devices` via [`SensorClient`]
//! - **Normalization**: raw devices to display-ready [`RoomData`](remo_types::RoomData)
//! - **Synthetic data**: random current readings and deterministic-phase
//!   history series ([`synthetic`])
//! - **Polling**: fixed-interval fetch with fallback and manual refresh
//!   ([`PollingController`])
//! - **Proxy mode**: consume the service's proxy endpoint without ever
//!   holding the credential ([`ProxyFeed`])
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use remo_core::{Credential, DirectFeed, PollerOptions, PollingController, SensorClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(SensorClient::new(remo_core::client::DEFAULT_BASE_URL)?);
//!     let feed = Arc::new(DirectFeed::new(client, Credential::from_env()));
//!
//!     let controller = PollingController::new(feed, PollerOptions::default());
//!     controller.start().await;
//!
//!     let mut updates = controller.subscribe();
//!     while updates.changed().await.is_ok() {
//!         let snapshot = updates.borrow().clone();
//!         println!("{} rooms, error: {:?}", snapshot.room_data.len(), snapshot.error);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod credential;
pub mod error;
pub mod feed;
pub mod mock;
pub mod normalize;
pub mod poller;
pub mod proxy;
pub mod synthetic;
pub mod traits;

pub use remo_types as types;

pub use client::SensorClient;
pub use credential::Credential;
pub use error::{Error, Result};
pub use feed::{DirectFeed, Fetch, ProxyFeed, RoomFeed};
pub use mock::MockSource;
pub use normalize::normalize;
pub use poller::{DataSource, Phase, PollerOptions, PollingController, Snapshot};
pub use proxy::ProxyClient;
pub use synthetic::SyntheticGenerator;
pub use traits::DeviceSource;
