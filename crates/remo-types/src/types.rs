//! Core types for Nature Remo sensor data.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseError;

/// A single sensor event as reported by the cloud API.
///
/// The provider sends the measured value under `val`. Older payloads (and some
/// local bridges) name the key after the quantity instead, so those keys are
/// accepted as aliases when decoding.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorEvent {
    /// Measured value.
    #[cfg_attr(
        feature = "serde",
        serde(alias = "temperature", alias = "humidity", alias = "illumination")
    )]
    pub val: f64,
    /// When the measurement was taken.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub created_at: OffsetDateTime,
}

impl SensorEvent {
    /// Create a new event.
    #[must_use]
    pub fn new(val: f64, created_at: OffsetDateTime) -> Self {
        Self { val, created_at }
    }
}

/// Latest event per physical quantity.
///
/// Any subset may be missing when the device has no sensor for that quantity.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NewestEvents {
    /// Temperature event (°C).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub te: Option<SensorEvent>,
    /// Humidity event (%).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub hu: Option<SensorEvent>,
    /// Illumination event.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub il: Option<SensorEvent>,
}

impl NewestEvents {
    /// Timestamp of the first present event, in temperature, humidity,
    /// illumination order.
    #[must_use]
    pub fn first_timestamp(&self) -> Option<OffsetDateTime> {
        [&self.te, &self.hu, &self.il]
            .into_iter()
            .flatten()
            .map(|event| event.created_at)
            .next()
    }

    /// Returns `true` if no event is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.te.is_none() && self.hu.is_none() && self.il.is_none()
    }
}

/// A device as returned by `GET /1/devices`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Device {
    /// Device ID.
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: String,
    /// Display name, used as the room name.
    pub name: String,
    /// Temperature calibration offset.
    #[cfg_attr(feature = "serde", serde(default))]
    pub temperature_offset: f64,
    /// Humidity calibration offset.
    #[cfg_attr(feature = "serde", serde(default))]
    pub humidity_offset: f64,
    /// Creation time.
    #[cfg_attr(
        feature = "serde",
        serde(default, with = "time::serde::rfc3339::option")
    )]
    pub created_at: Option<OffsetDateTime>,
    /// Last update time.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub updated_at: OffsetDateTime,
    /// Firmware version string.
    #[cfg_attr(feature = "serde", serde(default))]
    pub firmware_version: String,
    /// Wi-Fi MAC address.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mac_address: String,
    /// Bluetooth MAC address.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bt_mac_address: String,
    /// Serial number.
    #[cfg_attr(feature = "serde", serde(default))]
    pub serial_number: String,
    /// Latest sensor events.
    #[cfg_attr(feature = "serde", serde(default))]
    pub newest_events: NewestEvents,
}

impl Device {
    /// Create a device with only the fields the dashboard cares about.
    #[must_use]
    pub fn new(name: impl Into<String>, updated_at: OffsetDateTime) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            temperature_offset: 0.0,
            humidity_offset: 0.0,
            created_at: None,
            updated_at,
            firmware_version: String::new(),
            mac_address: String::new(),
            bt_mac_address: String::new(),
            serial_number: String::new(),
            newest_events: NewestEvents::default(),
        }
    }

    /// Set the newest events.
    #[must_use]
    pub fn with_events(mut self, events: NewestEvents) -> Self {
        self.newest_events = events;
        self
    }

    /// When this device last reported anything.
    ///
    /// The first present event timestamp wins; the device's own update time
    /// is used when no event exists.
    #[must_use]
    pub fn last_updated(&self) -> OffsetDateTime {
        self.newest_events
            .first_timestamp()
            .unwrap_or(self.updated_at)
    }
}

/// Normalized, display-ready reading for one room.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RoomData {
    /// Room name.
    pub name: String,
    /// Temperature in °C.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub temperature: Option<f64>,
    /// Relative humidity in %.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub humidity: Option<f64>,
    /// Illumination.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub illumination: Option<f64>,
    /// Resolved "last updated" time.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub last_updated: OffsetDateTime,
}

impl From<&Device> for RoomData {
    fn from(device: &Device) -> Self {
        let events = &device.newest_events;
        Self {
            name: device.name.clone(),
            temperature: events.te.as_ref().map(|e| e.val),
            humidity: events.hu.as_ref().map(|e| e.val),
            illumination: events.il.as_ref().map(|e| e.val),
            last_updated: device.last_updated(),
        }
    }
}

/// A point in a (synthetic) time series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryDataPoint {
    /// Sample time.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// Temperature in °C.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub temperature: Option<f64>,
    /// Relative humidity in %.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub humidity: Option<f64>,
    /// Illumination.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub illumination: Option<f64>,
}

/// History series for a single room.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RoomHistoryData {
    /// Room name.
    pub room_name: String,
    /// Points, oldest first.
    pub data: Vec<HistoryDataPoint>,
}

/// Look-back window presets offered by dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HistoryRange {
    /// Last 6 hours.
    #[cfg_attr(feature = "serde", serde(rename = "6h"))]
    SixHours,
    /// Last 24 hours.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "24h"))]
    Day,
    /// Last 72 hours.
    #[cfg_attr(feature = "serde", serde(rename = "72h"))]
    ThreeDays,
}

impl HistoryRange {
    /// All presets, shortest first.
    pub const ALL: [HistoryRange; 3] = [Self::SixHours, Self::Day, Self::ThreeDays];

    /// Window length in hours.
    #[must_use]
    pub fn hours(self) -> u32 {
        match self {
            Self::SixHours => 6,
            Self::Day => 24,
            Self::ThreeDays => 72,
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.hours())
    }
}

impl FromStr for HistoryRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "6h" => Ok(Self::SixHours),
            "24h" => Ok(Self::Day),
            "72h" => Ok(Self::ThreeDays),
            other => Err(ParseError::InvalidRange(other.to_string())),
        }
    }
}
