//! Platform-agnostic types for Nature Remo room sensors.
//!
//! This crate provides the data model shared by the acquisition core and the
//! HTTP service:
//!
//! - Raw API entities ([`Device`], [`NewestEvents`], [`SensorEvent`])
//! - Display-ready readings ([`RoomData`])
//! - Synthetic time series ([`HistoryDataPoint`], [`RoomHistoryData`], [`HistoryRange`])
//! - The proxy endpoint payload ([`ProxyResponse`])
//!
//! # Example
//!
//! ```
//! use remo_types::{Device, RoomData};
//! use time::OffsetDateTime;
//!
//! let device = Device::new("Study", OffsetDateTime::UNIX_EPOCH);
//! let room = RoomData::from(&device);
//! assert_eq!(room.temperature, None);
//! ```

pub mod error;
pub mod proxy;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use proxy::ProxyResponse;
pub use types::{
    Device, HistoryDataPoint, HistoryRange, NewestEvents, RoomData, RoomHistoryData, SensorEvent,
};
