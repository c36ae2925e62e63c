//! Wire payload of the server-side proxy endpoint.
//!
//! The endpoint always answers with HTTP 200 so that dashboards can branch on
//! `useMock` instead of treating a missing credential or an upstream failure
//! as a transport error.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{Device, RoomData};

/// Response body of `GET /api/nature-remo`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProxyResponse {
    /// Whether the caller should fall back to synthetic data.
    pub use_mock: bool,
    /// Always empty; present only in the "no credential" shape.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub devices: Option<Vec<Device>>,
    /// Advisory message when the upstream call failed.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub error: Option<String>,
    /// Normalized rooms on success.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub room_data: Option<Vec<RoomData>>,
}

impl ProxyResponse {
    /// No credential configured.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            use_mock: true,
            devices: Some(Vec::new()),
            ..Default::default()
        }
    }

    /// Upstream call failed.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            use_mock: true,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Live rooms.
    #[must_use]
    pub fn live(rooms: Vec<RoomData>) -> Self {
        Self {
            use_mock: false,
            room_data: Some(rooms),
            ..Default::default()
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_unconfigured_shape() {
        let json = serde_json::to_value(ProxyResponse::unconfigured()).unwrap();
        assert_eq!(json, serde_json::json!({"useMock": true, "devices": []}));
    }

    #[test]
    fn test_failed_shape() {
        let json = serde_json::to_value(ProxyResponse::failed("API error: 401 Unauthorized"))
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"useMock": true, "error": "API error: 401 Unauthorized"})
        );
    }

    #[test]
    fn test_live_shape() {
        let rooms = vec![RoomData {
            name: "Study".to_string(),
            temperature: Some(24.5),
            humidity: Some(41.0),
            illumination: None,
            last_updated: datetime!(2024-05-01 08:00 UTC),
        }];
        let json = serde_json::to_value(ProxyResponse::live(rooms)).unwrap();
        assert_eq!(json["useMock"], false);
        assert_eq!(json["roomData"][0]["name"], "Study");
        assert!(json.get("error").is_none());
        assert!(json.get("devices").is_none());
    }

    #[test]
    fn test_decodes_minimal_body() {
        let response: ProxyResponse = serde_json::from_str(r#"{"useMock": true}"#).unwrap();
        assert!(response.use_mock);
        assert!(response.error.is_none());
        assert!(response.room_data.is_none());
    }
}
